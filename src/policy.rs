use crate::auth::Role;

/// Add/delete rights over grades and homework.
pub fn can_manage_content(role: Role) -> bool {
    matches!(role, Role::Teacher | Role::Deputy | Role::Principal)
}

/// Teacher/student rosters and the schedule.
pub fn can_manage_roster(role: Role) -> bool {
    matches!(role, Role::Principal)
}

/// Marking homework done is the student's side of the contract.
pub fn can_toggle_homework(role: Role) -> bool {
    matches!(role, Role::Student)
}

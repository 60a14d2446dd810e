use chrono::Local;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::Role;
use crate::config::GradeAckPolicy;
use crate::policy;

pub const SNAPSHOT_VERSION: i64 = 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("operation not permitted for this role")]
    Forbidden,
    #[error("grade value {0} is out of range (2..=5)")]
    InvalidGrade(i64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub subject: String,
    pub value: i64,
    pub date: String,
    pub is_new: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Homework {
    pub id: i64,
    pub subject: String,
    pub task: String,
    pub deadline: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i64,
    pub time: String,
    pub subject: String,
    pub teacher: String,
    pub room: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherEntry {
    pub id: i64,
    pub name: String,
    pub subject: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentEntry {
    pub id: i64,
    pub name: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub email: String,
    pub phone: String,
}

/// Next-id counters, one per identified collection. Strictly monotonic:
/// deleting an entry never frees its id for reuse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Counters {
    homework: i64,
    lesson: i64,
    teacher: i64,
    student: i64,
}

/// Persisted envelope as read back from the slot. Every field may be absent;
/// an absent field takes its seed default alone.
#[derive(Deserialize)]
struct RawSnapshot {
    version: Option<i64>,
    grades: Option<Vec<Grade>>,
    homeworks: Option<Vec<Homework>>,
    teachers: Option<Vec<TeacherEntry>>,
    students: Option<Vec<StudentEntry>>,
    schedule: Option<Vec<Lesson>>,
    notifications: Option<i64>,
    counters: Option<Counters>,
}

#[derive(Serialize)]
struct SnapshotOut<'a> {
    version: i64,
    grades: &'a [Grade],
    homeworks: &'a [Homework],
    teachers: &'a [TeacherEntry],
    students: &'a [StudentEntry],
    schedule: &'a [Lesson],
    notifications: i64,
    counters: Counters,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub average_grade: f64,
    pub active_homework: i64,
    pub new_grades: i64,
    pub notifications: i64,
}

fn seed_teachers() -> Vec<TeacherEntry> {
    vec![
        TeacherEntry {
            id: 1,
            name: "Иванова Мария Петровна".into(),
            subject: "Математика".into(),
            email: "ivanova@school.ru".into(),
            phone: "+7 (999) 123-45-67".into(),
        },
        TeacherEntry {
            id: 2,
            name: "Петров Сергей Иванович".into(),
            subject: "Русский язык".into(),
            email: "petrov@school.ru".into(),
            phone: "+7 (999) 234-56-78".into(),
        },
        TeacherEntry {
            id: 3,
            name: "Сидорова Анна Викторовна".into(),
            subject: "История".into(),
            email: "sidorova@school.ru".into(),
            phone: "+7 (999) 345-67-89".into(),
        },
        TeacherEntry {
            id: 4,
            name: "Козлов Дмитрий Александрович".into(),
            subject: "Физика".into(),
            email: "kozlov@school.ru".into(),
            phone: "+7 (999) 456-78-90".into(),
        },
    ]
}

fn seed_students() -> Vec<StudentEntry> {
    vec![
        StudentEntry {
            id: 1,
            name: "Смирнов Алексей Игоревич".into(),
            class_name: "7А".into(),
            email: "smirnov@school.ru".into(),
            phone: "+7 (999) 567-89-01".into(),
        },
        StudentEntry {
            id: 2,
            name: "Кузнецова Елена Андреевна".into(),
            class_name: "7А".into(),
            email: "kuznetsova@school.ru".into(),
            phone: "+7 (999) 678-90-12".into(),
        },
        StudentEntry {
            id: 3,
            name: "Попов Михаил Сергеевич".into(),
            class_name: "7Б".into(),
            email: "popov@school.ru".into(),
            phone: "+7 (999) 789-01-23".into(),
        },
    ]
}

fn seed_schedule() -> Vec<Lesson> {
    vec![
        Lesson {
            id: 1,
            time: "08:30 - 09:15".into(),
            subject: "Математика".into(),
            teacher: "Иванова М.П.".into(),
            room: "205".into(),
        },
        Lesson {
            id: 2,
            time: "09:25 - 10:10".into(),
            subject: "Русский язык".into(),
            teacher: "Петров С.И.".into(),
            room: "312".into(),
        },
        Lesson {
            id: 3,
            time: "10:25 - 11:10".into(),
            subject: "История".into(),
            teacher: "Сидорова А.В.".into(),
            room: "408".into(),
        },
        Lesson {
            id: 4,
            time: "11:30 - 12:15".into(),
            subject: "Физика".into(),
            teacher: "Козлов Д.А.".into(),
            room: "215".into(),
        },
        Lesson {
            id: 5,
            time: "12:25 - 13:10".into(),
            subject: "Английский язык".into(),
            teacher: "Смирнова О.Н.".into(),
            room: "301".into(),
        },
    ]
}

fn today_display() -> String {
    Local::now().format("%d.%m.%Y").to_string()
}

fn next_id_after<I: Iterator<Item = i64>>(ids: I) -> i64 {
    ids.max().unwrap_or(0) + 1
}

/// The whole mutable application state: five collections plus the
/// notification counter. Mutation goes through the methods below only, and
/// every mutation re-checks the role policy itself instead of trusting the
/// call site.
#[derive(Debug)]
pub struct Diary {
    pub grades: Vec<Grade>,
    pub homeworks: Vec<Homework>,
    pub teachers: Vec<TeacherEntry>,
    pub students: Vec<StudentEntry>,
    pub schedule: Vec<Lesson>,
    pub notifications: i64,
    counters: Counters,
    ack: GradeAckPolicy,
}

impl Diary {
    pub fn seed(ack: GradeAckPolicy) -> Self {
        let teachers = seed_teachers();
        let students = seed_students();
        let schedule = seed_schedule();
        let counters = Counters {
            homework: 1,
            lesson: next_id_after(schedule.iter().map(|l| l.id)),
            teacher: next_id_after(teachers.iter().map(|t| t.id)),
            student: next_id_after(students.iter().map(|s| s.id)),
        };
        Self {
            grades: Vec::new(),
            homeworks: Vec::new(),
            teachers,
            students,
            schedule,
            notifications: 0,
            counters,
            ack,
        }
    }

    /// Rehydrates from the persisted slot. `None` (missing key, or a value
    /// the adapter already rejected as unparseable) and any malformed or
    /// too-new envelope all land on the seed defaults; a well-formed
    /// envelope with some fields absent defaults those fields alone.
    pub fn from_value(value: Option<serde_json::Value>, ack: GradeAckPolicy) -> Self {
        let Some(value) = value else {
            return Self::seed(ack);
        };
        let raw: RawSnapshot = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("malformed snapshot ({}); using seed defaults", &e);
                return Self::seed(ack);
            }
        };
        if let Some(v) = raw.version {
            if v > SNAPSHOT_VERSION {
                log::warn!(
                    "snapshot version {} is newer than supported {}; using seed defaults",
                    v,
                    SNAPSHOT_VERSION
                );
                return Self::seed(ack);
            }
        }

        let grades = raw.grades.unwrap_or_default();
        let homeworks = raw.homeworks.unwrap_or_default();
        let teachers = raw.teachers.unwrap_or_else(seed_teachers);
        let students = raw.students.unwrap_or_else(seed_students);
        let schedule = raw.schedule.unwrap_or_else(seed_schedule);
        let notifications = raw.notifications.unwrap_or(0).max(0);

        // Pre-versioning blobs carry no counters; derive them, and clamp
        // stored ones so a hand-edited slot can never hand out a live id.
        let mut counters = raw.counters.unwrap_or(Counters {
            homework: 0,
            lesson: 0,
            teacher: 0,
            student: 0,
        });
        counters.homework = counters
            .homework
            .max(next_id_after(homeworks.iter().map(|h| h.id)));
        counters.lesson = counters
            .lesson
            .max(next_id_after(schedule.iter().map(|l| l.id)));
        counters.teacher = counters
            .teacher
            .max(next_id_after(teachers.iter().map(|t| t.id)));
        counters.student = counters
            .student
            .max(next_id_after(students.iter().map(|s| s.id)));

        Self {
            grades,
            homeworks,
            teachers,
            students,
            schedule,
            notifications,
            counters,
            ack,
        }
    }

    pub fn to_value(&self) -> serde_json::Value {
        let out = SnapshotOut {
            version: SNAPSHOT_VERSION,
            grades: &self.grades,
            homeworks: &self.homeworks,
            teachers: &self.teachers,
            students: &self.students,
            schedule: &self.schedule,
            notifications: self.notifications,
            counters: self.counters,
        };
        serde_json::to_value(out).unwrap_or(serde_json::Value::Null)
    }

    pub fn add_grade(&mut self, role: Role, subject: &str, value: i64) -> Result<&Grade, StoreError> {
        if !policy::can_manage_content(role) {
            return Err(StoreError::Forbidden);
        }
        if !(2..=5).contains(&value) {
            return Err(StoreError::InvalidGrade(value));
        }
        self.grades.insert(
            0,
            Grade {
                subject: subject.to_owned(),
                value,
                date: today_display(),
                is_new: true,
            },
        );
        self.notifications += 1;
        Ok(&self.grades[0])
    }

    /// Clears the "new" badges under the `explicit` policy. Returns whether
    /// anything changed.
    pub fn acknowledge_grades(&mut self) -> bool {
        if self.ack != GradeAckPolicy::Explicit {
            return false;
        }
        self.clear_new_flags()
    }

    /// Called after the grades have been served once; clears the badges
    /// under the `on-view` policy. Returns whether anything changed.
    pub fn grades_viewed(&mut self) -> bool {
        if self.ack != GradeAckPolicy::OnView {
            return false;
        }
        self.clear_new_flags()
    }

    fn clear_new_flags(&mut self) -> bool {
        let mut changed = false;
        for g in &mut self.grades {
            if g.is_new {
                g.is_new = false;
                changed = true;
            }
        }
        changed
    }

    pub fn add_homework(
        &mut self,
        role: Role,
        subject: &str,
        task: &str,
        deadline: &str,
    ) -> Result<&Homework, StoreError> {
        if !policy::can_manage_content(role) {
            return Err(StoreError::Forbidden);
        }
        let id = self.counters.homework;
        self.counters.homework += 1;
        let idx = self.homeworks.len();
        self.homeworks.push(Homework {
            id,
            subject: subject.to_owned(),
            task: task.to_owned(),
            deadline: deadline.to_owned(),
            completed: false,
        });
        Ok(&self.homeworks[idx])
    }

    /// Flips `completed` on the matching entry; `Ok(None)` when the id is
    /// absent.
    pub fn toggle_homework(&mut self, role: Role, id: i64) -> Result<Option<bool>, StoreError> {
        if !policy::can_toggle_homework(role) {
            return Err(StoreError::Forbidden);
        }
        for hw in &mut self.homeworks {
            if hw.id == id {
                hw.completed = !hw.completed;
                return Ok(Some(hw.completed));
            }
        }
        Ok(None)
    }

    pub fn delete_homework(&mut self, role: Role, id: i64) -> Result<bool, StoreError> {
        if !policy::can_manage_content(role) {
            return Err(StoreError::Forbidden);
        }
        let before = self.homeworks.len();
        self.homeworks.retain(|hw| hw.id != id);
        Ok(self.homeworks.len() != before)
    }

    pub fn add_lesson(
        &mut self,
        role: Role,
        time: &str,
        subject: &str,
        teacher: &str,
        room: &str,
    ) -> Result<&Lesson, StoreError> {
        if !policy::can_manage_roster(role) {
            return Err(StoreError::Forbidden);
        }
        let id = self.counters.lesson;
        self.counters.lesson += 1;
        let idx = self.schedule.len();
        self.schedule.push(Lesson {
            id,
            time: time.to_owned(),
            subject: subject.to_owned(),
            teacher: teacher.to_owned(),
            room: room.to_owned(),
        });
        Ok(&self.schedule[idx])
    }

    pub fn delete_lesson(&mut self, role: Role, id: i64) -> Result<bool, StoreError> {
        if !policy::can_manage_roster(role) {
            return Err(StoreError::Forbidden);
        }
        let before = self.schedule.len();
        self.schedule.retain(|l| l.id != id);
        Ok(self.schedule.len() != before)
    }

    pub fn add_teacher(
        &mut self,
        role: Role,
        name: &str,
        subject: &str,
        email: &str,
        phone: &str,
    ) -> Result<&TeacherEntry, StoreError> {
        if !policy::can_manage_roster(role) {
            return Err(StoreError::Forbidden);
        }
        let id = self.counters.teacher;
        self.counters.teacher += 1;
        let idx = self.teachers.len();
        self.teachers.push(TeacherEntry {
            id,
            name: name.to_owned(),
            subject: subject.to_owned(),
            email: email.to_owned(),
            phone: phone.to_owned(),
        });
        Ok(&self.teachers[idx])
    }

    pub fn delete_teacher(&mut self, role: Role, id: i64) -> Result<bool, StoreError> {
        if !policy::can_manage_roster(role) {
            return Err(StoreError::Forbidden);
        }
        let before = self.teachers.len();
        self.teachers.retain(|t| t.id != id);
        Ok(self.teachers.len() != before)
    }

    pub fn add_student(
        &mut self,
        role: Role,
        name: &str,
        class_name: &str,
        email: &str,
        phone: &str,
    ) -> Result<&StudentEntry, StoreError> {
        if !policy::can_manage_roster(role) {
            return Err(StoreError::Forbidden);
        }
        let id = self.counters.student;
        self.counters.student += 1;
        let idx = self.students.len();
        self.students.push(StudentEntry {
            id,
            name: name.to_owned(),
            class_name: class_name.to_owned(),
            email: email.to_owned(),
            phone: phone.to_owned(),
        });
        Ok(&self.students[idx])
    }

    pub fn delete_student(&mut self, role: Role, id: i64) -> Result<bool, StoreError> {
        if !policy::can_manage_roster(role) {
            return Err(StoreError::Forbidden);
        }
        let before = self.students.len();
        self.students.retain(|s| s.id != id);
        Ok(self.students.len() != before)
    }

    /// The bell affordance: resets the counter.
    pub fn read_notifications(&mut self) -> i64 {
        self.notifications = 0;
        self.notifications
    }

    pub fn summary(&self) -> Summary {
        let average_grade = if self.grades.is_empty() {
            0.0
        } else {
            let sum: i64 = self.grades.iter().map(|g| g.value).sum();
            let avg = sum as f64 / self.grades.len() as f64;
            (avg * 10.0).round() / 10.0
        };
        Summary {
            average_grade,
            active_homework: self.homeworks.iter().filter(|hw| !hw.completed).count() as i64,
            new_grades: self.grades.iter().filter(|g| g.is_new).count() as i64,
            notifications: self.notifications,
        }
    }
}

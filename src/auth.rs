use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Student,
    Teacher,
    Deputy,
    Principal,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Deputy => "deputy",
            Role::Principal => "principal",
        }
    }

    /// Display name the header renders next to the avatar.
    pub fn display_name(self) -> &'static str {
        match self {
            Role::Student => "Ученик",
            Role::Teacher => "Учитель",
            Role::Deputy => "Завуч",
            Role::Principal => "Директор",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
}

/// The core depends on this seam only; swapping in a real identity backend
/// means providing another implementation.
pub trait CredentialProvider {
    fn authenticate(&self, username: &str, secret: &str) -> Option<Role>;
}

/// Built-in demo accounts. Usernames are stored lowercase; lookup lowercases
/// the input, so `ДИРЕКТОР` resolves like `директор`. Passwords compare
/// exactly, in clear text.
const BUILTIN_ACCOUNTS: &[(&str, &str, Role)] = &[
    ("ученик", "1234", Role::Student),
    ("учитель", "1234", Role::Teacher),
    ("завуч", "1234", Role::Deputy),
    ("директор", "1234", Role::Principal),
    ("директор", "89223109976", Role::Principal),
];

pub struct StaticCredentials {
    entries: &'static [(&'static str, &'static str, Role)],
}

impl StaticCredentials {
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_ACCOUNTS,
        }
    }
}

impl CredentialProvider for StaticCredentials {
    fn authenticate(&self, username: &str, secret: &str) -> Option<Role> {
        let uname = username.trim().to_lowercase();
        // Last definition wins for a duplicated (username, password) pair;
        // distinct passwords for one username all stay valid.
        self.entries
            .iter()
            .rev()
            .find(|(u, p, _)| *u == uname && *p == secret)
            .map(|(_, _, role)| *role)
    }
}

/// Auth state machine. Logged-out carries no role at all; the only
/// transitions are login (success or failure) and logout.
#[derive(Debug)]
pub enum Session {
    LoggedOut { error: Option<String> },
    LoggedIn { username: String, role: Role },
}

impl Session {
    pub fn new() -> Self {
        Session::LoggedOut { error: None }
    }

    pub fn login(
        &mut self,
        provider: &dyn CredentialProvider,
        username: &str,
        password: &str,
    ) -> Result<Role, AuthError> {
        match provider.authenticate(username, password) {
            Some(role) => {
                *self = Session::LoggedIn {
                    username: username.trim().to_lowercase(),
                    role,
                };
                Ok(role)
            }
            None => {
                *self = Session::LoggedOut {
                    error: Some(AuthError::InvalidCredentials.to_string()),
                };
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    pub fn logout(&mut self) {
        *self = Session::new();
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            Session::LoggedIn { role, .. } => Some(*role),
            Session::LoggedOut { .. } => None,
        }
    }
}

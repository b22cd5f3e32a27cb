use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::uri::Uri;

/// Coarse role of the user acting on a research object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Authenticated,
    Anonymous,
    Public,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Admin => "admin",
            Role::Authenticated => "authenticated",
            Role::Anonymous => "anonymous",
            Role::Public => "public",
        };
        f.write_str(s)
    }
}

impl FromStr for Role {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "authenticated" => Ok(Role::Authenticated),
            "anonymous" => Ok(Role::Anonymous),
            "public" => Ok(Role::Public),
            _ => Err(TypeError::UnknownRole(s.to_string())),
        }
    }
}

/// Identity of the user on whose behalf operations run.
///
/// The URI is what ends up in `dcterms:creator` statements; the name is
/// recorded next to copy authors so that it survives without a user
/// directory.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserMetadata {
    pub login: String,
    pub name: String,
    pub role: Role,
    pub uri: Uri,
}

impl UserMetadata {
    pub fn new(login: impl Into<String>, name: impl Into<String>, role: Role, uri: Uri) -> Self {
        Self {
            login: login.into(),
            name: name.into(),
            role,
            uri,
        }
    }

    /// A user known only by URI, e.g. a creator read back from a manifest.
    pub fn from_uri(uri: Uri) -> Self {
        let name = uri.as_str().to_string();
        Self {
            login: name.clone(),
            name,
            role: Role::Authenticated,
            uri,
        }
    }

    /// Returns `true` for the unauthenticated public identity.
    pub fn is_public(&self) -> bool {
        matches!(self.role, Role::Public | Role::Anonymous)
    }
}

impl fmt::Display for UserMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_is_case_insensitive() {
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("public".parse::<Role>().unwrap(), Role::Public);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn from_uri_uses_uri_as_name() {
        let u = UserMetadata::from_uri(Uri::parse("http://ex/users/alice").unwrap());
        assert_eq!(u.name, "http://ex/users/alice");
        assert_eq!(u.role, Role::Authenticated);
        assert!(!u.is_public());
    }

    #[test]
    fn display_includes_uri() {
        let u = UserMetadata::new(
            "bob",
            "Bob",
            Role::Public,
            Uri::parse("http://ex/users/bob").unwrap(),
        );
        assert_eq!(u.to_string(), "Bob <http://ex/users/bob>");
        assert!(u.is_public());
    }
}

//! Access policy for apps and the certificates attached to them.
//!
//! Every decision goes through [`Capabilities`]: the caller's relationship to
//! one resource is resolved once, then checked against the [`Operation`] being
//! attempted. Handlers never branch on roles themselves.
//!
//! Callers must resolve the resource before asking the guard. A missing
//! resource is reported as not found for every caller, and only a resource
//! that exists can produce [`CallerError::Forbidden`].

use tracing::debug;

use crate::caller::{Caller, CallerError};

/// A resource with a single owner and a set of collaborators.
pub trait OwnedResource {
    fn owner_id(&self) -> &str;
    fn is_collaborator(&self, user_id: &str) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ViewApp,
    DeleteApp,
    ManageCollaborators,
    CreateCertificate,
    ListCertificates,
    ReadCertificate,
    UpdateCertificate,
    DeleteCertificate,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ViewApp => "apps:view",
            Operation::DeleteApp => "apps:delete",
            Operation::ManageCollaborators => "apps:perms",
            Operation::CreateCertificate => "certs:create",
            Operation::ListCertificates => "certs:list",
            Operation::ReadCertificate => "certs:read",
            Operation::UpdateCertificate => "certs:update",
            Operation::DeleteCertificate => "certs:delete",
        }
    }

    /// Collaborators share the owner's rights over certificates, but cannot
    /// delete the app or change who has access to it.
    fn open_to_collaborators(&self) -> bool {
        !matches!(self, Operation::DeleteApp | Operation::ManageCollaborators)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a caller is with respect to one resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub is_platform_admin: bool,
    pub is_resource_owner: bool,
    pub is_resource_collaborator: bool,
}

impl Capabilities {
    pub fn of<R: OwnedResource + ?Sized>(caller: &Caller, resource: &R) -> Self {
        let user_id = caller.user_id();
        Self {
            is_platform_admin: caller.is_admin(),
            is_resource_owner: user_id.is_some_and(|id| id == resource.owner_id()),
            is_resource_collaborator: user_id.is_some_and(|id| resource.is_collaborator(id)),
        }
    }

    pub fn permits(&self, operation: Operation) -> bool {
        self.is_platform_admin
            || self.is_resource_owner
            || (self.is_resource_collaborator && operation.open_to_collaborators())
    }
}

pub fn can<R: OwnedResource + ?Sized>(caller: &Caller, resource: &R, operation: Operation) -> bool {
    Capabilities::of(caller, resource).permits(operation)
}

/// Allow or deny `operation` on `resource`, producing
/// [`CallerError::Forbidden`] on denial.
pub fn authorize<R: OwnedResource + ?Sized>(
    caller: &Caller,
    resource: &R,
    operation: Operation,
) -> Result<(), CallerError> {
    let capabilities = Capabilities::of(caller, resource);
    if capabilities.permits(operation) {
        return Ok(());
    }

    debug!(%caller, %operation, ?capabilities, "Access denied");
    Err(CallerError::forbidden(operation.as_str()))
}

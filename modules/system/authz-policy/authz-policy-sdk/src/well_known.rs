//! Well-known catalog values.
//!
//! The privilege, credential and resource-type catalogs are owned by the
//! platform; these constants cover the values the platform ships with. The
//! engine never interprets them beyond equality, except [`privileges::READ`]
//! which anonymous-read access grants.

/// Privilege catalog.
pub mod privileges {
    use crate::models::Privilege;

    pub const READ: Privilege = Privilege::from_static("read");
    pub const CREATE: Privilege = Privilege::from_static("create");
    pub const UPDATE: Privilege = Privilege::from_static("update");
    pub const DELETE: Privilege = Privilege::from_static("delete");
    pub const GRANT: Privilege = Privilege::from_static("grant");
    pub const CONTRIBUTE: Privilege = Privilege::from_static("contribute");
    pub const CREATE_CALLOUT: Privilege = Privilege::from_static("create-callout");
    pub const CREATE_RELATION: Privilege = Privilege::from_static("create-relation");
    pub const CREATE_MESSAGE: Privilege = Privilege::from_static("create-message");
    pub const UPDATE_CONTENT: Privilege = Privilege::from_static("update-content");
    pub const UPDATE_INNOVATION_FLOW: Privilege =
        Privilege::from_static("update-innovation-flow");
    pub const FILE_UPLOAD: Privilege = Privilege::from_static("file-upload");
    pub const FILE_DELETE: Privilege = Privilege::from_static("file-delete");
    pub const READ_USERS: Privilege = Privilege::from_static("read-users");
}

/// Credential catalog.
pub mod credentials {
    use crate::models::CredentialType;

    pub const GLOBAL_ADMIN: CredentialType = CredentialType::from_static("global-admin");
    pub const GLOBAL_SUPPORT: CredentialType = CredentialType::from_static("global-support");
    pub const GLOBAL_COMMUNITY_READ: CredentialType =
        CredentialType::from_static("global-community-read");
    pub const GLOBAL_REGISTERED: CredentialType =
        CredentialType::from_static("global-registered");
    pub const GLOBAL_ANONYMOUS: CredentialType = CredentialType::from_static("global-anonymous");
    pub const SPACE_ADMIN: CredentialType = CredentialType::from_static("space-admin");
    pub const SPACE_MEMBER: CredentialType = CredentialType::from_static("space-member");
    pub const SPACE_LEAD: CredentialType = CredentialType::from_static("space-lead");
    pub const USER_SELF_MANAGEMENT: CredentialType =
        CredentialType::from_static("user-self-management");
}

/// Resource types of the collaboration tree.
pub mod resource_types {
    use crate::models::ResourceType;

    pub const SPACE: ResourceType = ResourceType::from_static("space");
    pub const COLLABORATION: ResourceType = ResourceType::from_static("collaboration");
    pub const CALLOUTS_SET: ResourceType = ResourceType::from_static("callouts-set");
    pub const CALLOUT: ResourceType = ResourceType::from_static("callout");
    pub const CALLOUT_CONTRIBUTION: ResourceType =
        ResourceType::from_static("callout-contribution");
    pub const INNOVATION_FLOW: ResourceType = ResourceType::from_static("innovation-flow");
    pub const TIMELINE: ResourceType = ResourceType::from_static("timeline");
    pub const CALENDAR: ResourceType = ResourceType::from_static("calendar");
    pub const RELATION: ResourceType = ResourceType::from_static("relation");
    pub const LICENSE: ResourceType = ResourceType::from_static("license");
    pub const STORAGE_BUCKET: ResourceType = ResourceType::from_static("storage-bucket");
    pub const DOCUMENT: ResourceType = ResourceType::from_static("document");
    /// Policies built for a single check and never persisted.
    pub const IN_MEMORY: ResourceType = ResourceType::from_static("in-memory");
}

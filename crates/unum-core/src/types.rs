use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// The fixed DID method token for identities anchored by this engine.
pub const DID_METHOD: &str = "cardano";

/// Ledger networks an identity can be anchored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Production network.
    Mainnet,
    /// Pre-production test network.
    Preprod,
    /// Preview test network.
    Preview,
}

impl Network {
    /// Parse a network tag as it appears inside a DID.
    pub fn parse(tag: &str) -> Result<Self, CoreError> {
        match tag {
            "mainnet" => Ok(Self::Mainnet),
            "preprod" => Ok(Self::Preprod),
            "preview" => Ok(Self::Preview),
            other => Err(CoreError::UnsupportedNetwork(other.to_string())),
        }
    }

    /// The tag used inside DID strings. Never contains `:` or NUL.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Preprod => "preprod",
            Self::Preview => "preview",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decentralized Identifier issued by the engine.
/// Format: `did:cardano:<network>:<multibase-digest>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Did(pub String);

impl Did {
    /// Create a DID from a full URI string, validating its shape.
    pub fn new(uri: String) -> Result<Self, CoreError> {
        let parts: Vec<&str> = uri.splitn(4, ':').collect();
        if parts.len() < 4 || parts[0] != "did" || parts[1] != DID_METHOD {
            return Err(CoreError::InvalidDid(format!(
                "DID must have format 'did:{}:<network>:<identifier>', got: {}",
                DID_METHOD, uri
            )));
        }
        Network::parse(parts[2])?;
        if parts[3].is_empty() {
            return Err(CoreError::InvalidDid(format!(
                "DID has an empty identifier: {}",
                uri
            )));
        }
        Ok(Self(uri))
    }

    /// Create a DID from its network and encoded-digest components.
    pub fn from_parts(network: Network, identifier: &str) -> Self {
        Self(format!("did:{}:{}:{}", DID_METHOD, network, identifier))
    }

    /// Get the full DID URI.
    pub fn uri(&self) -> &str {
        &self.0
    }

    /// Extract the method token.
    pub fn method(&self) -> Option<&str> {
        self.0.split(':').nth(1)
    }

    /// Extract the network tag.
    pub fn network(&self) -> Option<&str> {
        self.0.split(':').nth(2)
    }

    /// Extract the encoded-digest identifier.
    pub fn identifier(&self) -> Option<&str> {
        let parts: Vec<&str> = self.0.splitn(4, ':').collect();
        parts.get(3).copied()
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A reference (public key or wallet identifier) authorized to act for an
/// identity. Opaque to the engine; authorization is a membership test.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Controller(pub String);

impl Controller {
    /// Create a new controller reference.
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Get the controller reference string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered set of controllers: insertion order is preserved, duplicates
/// are dropped on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ControllerSet(Vec<Controller>);

impl ControllerSet {
    /// Create an empty controller set.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Build a set from a vector, keeping the first occurrence of each
    /// controller.
    pub fn from_vec(controllers: Vec<Controller>) -> Self {
        let mut set = Self::new();
        for controller in controllers {
            set.insert(controller);
        }
        set
    }

    /// Insert a controller at the end of the ordering.
    /// Returns false if it was already present.
    pub fn insert(&mut self, controller: Controller) -> bool {
        if self.0.contains(&controller) {
            return false;
        }
        self.0.push(controller);
        true
    }

    /// Remove a controller, preserving the order of the rest.
    /// Returns false if it was not present.
    pub fn remove(&mut self, controller: &Controller) -> bool {
        let before = self.0.len();
        self.0.retain(|c| c != controller);
        self.0.len() != before
    }

    /// Membership test.
    pub fn contains(&self, controller: &Controller) -> bool {
        self.0.contains(controller)
    }

    /// Number of controllers in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Controller> {
        self.0.iter()
    }

    /// View as a slice in insertion order.
    pub fn as_slice(&self) -> &[Controller] {
        &self.0
    }
}

impl Default for ControllerSet {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Controller>> for ControllerSet {
    fn from(controllers: Vec<Controller>) -> Self {
        Self::from_vec(controllers)
    }
}

impl<'de> Deserialize<'de> for ControllerSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = Vec::<Controller>::deserialize(deserializer)?;
        Ok(Self::from_vec(raw))
    }
}

/// Closed, ordered set of metadata schema versions.
///
/// `V1_0` is the legacy wallet-embedded era: a single controller and no
/// enrollment timestamp or revocation slot. `V1_1` is the deterministic
/// era: ordered controller set, explicit enrollment timestamp, optional
/// revocation timestamp. New versions add fields, never repurpose them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum SchemaVersion {
    #[serde(rename = "1.0")]
    V1_0,
    #[serde(rename = "1.1")]
    V1_1,
}

impl SchemaVersion {
    /// The version new enrollments are issued under.
    pub const CURRENT: SchemaVersion = SchemaVersion::V1_1;

    /// Parse a wire-format version string.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "1.0" => Ok(Self::V1_0),
            "1.1" => Ok(Self::V1_1),
            other => Err(CoreError::UnknownSchemaVersion(other.to_string())),
        }
    }

    /// The wire-format version string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1_0 => "1.0",
            Self::V1_1 => "1.1",
        }
    }

    /// Whether this schema admits more than one controller.
    pub fn supports_controller_set(&self) -> bool {
        *self >= Self::V1_1
    }

    /// Whether this schema carries enrollment/revocation timestamps.
    pub fn supports_timestamps(&self) -> bool {
        *self >= Self::V1_1
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why an identity was revoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevocationReason {
    /// The holder asked for the identity to be deactivated.
    UserRequest,
    /// A controller key is known or suspected compromised.
    KeyCompromise,
    /// Right-to-erasure request: the DID stays, off-ledger PII is purged.
    RightToErasure,
    /// Free-form operator reason.
    Other(String),
}

impl fmt::Display for RevocationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserRequest => write!(f, "UserRequest"),
            Self::KeyCompromise => write!(f, "KeyCompromise"),
            Self::RightToErasure => write!(f, "RightToErasure"),
            Self::Other(reason) => write!(f, "Other({})", reason),
        }
    }
}

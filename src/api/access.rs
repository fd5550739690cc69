// codepatcher: Code Patch Manager
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Capabilities and the principal that holds them.

use bitflags::bitflags;

use crate::config::types::AccessConfig;
use crate::error::{ConfigError, PatcherResult, permission_denied};

bitflags! {
    /// Named permissions checked by the endpoints.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capability: u32 {
        const VIEWPATCH = 0x001;
        const ADDPATCH = 0x002;
        const EDITPATCH = 0x004;
        const VIEWREPORTS = 0x008;
        const CONFIG = 0x010;
        const DELETEPATCH = 0x020;
        const RESTOREPATCH = 0x040;
        const APPLYPATCH = 0x080;
        const DELETEPATCHREPORT = 0x100;
    }
}

const NAMES: &[(Capability, &str)] = &[
    (Capability::VIEWPATCH, "viewpatch"),
    (Capability::ADDPATCH, "addpatch"),
    (Capability::EDITPATCH, "editpatch"),
    (Capability::VIEWREPORTS, "viewreports"),
    (Capability::CONFIG, "config"),
    (Capability::DELETEPATCH, "deletepatch"),
    (Capability::RESTOREPATCH, "restorepatch"),
    (Capability::APPLYPATCH, "applypatch"),
    (Capability::DELETEPATCHREPORT, "deletepatchreport"),
];

impl Capability {
    /// Look up a single capability by name (`applypatch`, `viewreports`, ...).
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        let name = name.trim();
        NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(cap, _)| *cap)
    }

    /// Name of a single capability; flag sets have none.
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        NAMES.iter().find(|(cap, _)| *cap == self).map(|(_, n)| *n)
    }
}

/// Answers whether the caller holds a capability.
pub trait CapabilityChecker: Send + Sync {
    fn has_capability(&self, capability: Capability) -> bool;

    /// # Errors
    ///
    /// Returns `PermissionDenied` naming the missing capability.
    fn require(&self, capability: Capability) -> PatcherResult<()> {
        if self.has_capability(capability) {
            Ok(())
        } else {
            Err(permission_denied(capability.name().unwrap_or("unknown")))
        }
    }
}

/// A caller with a fixed set of capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    granted: Capability,
}

impl Principal {
    /// Holds every capability.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            granted: Capability::all(),
        }
    }

    #[must_use]
    pub const fn with(granted: Capability) -> Self {
        Self { granted }
    }

    /// Build from `[access] capabilities`; an absent list grants everything.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for an unknown capability name.
    pub fn from_config(access: &AccessConfig) -> Result<Self, ConfigError> {
        let Some(names) = &access.capabilities else {
            return Ok(Self::all());
        };
        let mut granted = Capability::empty();
        for name in names {
            granted |= Capability::by_name(name).ok_or_else(|| ConfigError::InvalidValue {
                section: "access".to_string(),
                key: "capabilities".to_string(),
                message: format!("unknown capability '{name}'"),
            })?;
        }
        Ok(Self { granted })
    }

    #[must_use]
    pub const fn granted(&self) -> Capability {
        self.granted
    }
}

impl CapabilityChecker for Principal {
    fn has_capability(&self, capability: Capability) -> bool {
        self.granted.contains(capability)
    }
}

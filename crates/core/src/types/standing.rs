//! Vendor standing: the approval workflow as a sum type.
//!
//! The backend sends a flat record (`status` plus optional `rejection_reason`,
//! `suspension_reason`, `approved_by`). [`VendorStanding`] keeps only the
//! fields that are meaningful for each status, so views match on it
//! exhaustively instead of testing fields one after another.
//!
//! ```text
//! pending ──► approved ──► suspended
//!    │            ▲            │
//!    ▼            └────────────┘
//! rejected
//! ```

use super::status::VendorStatus;

/// Where a vendor account stands in the approval workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VendorStanding {
    /// Waiting for an administrator's review.
    Pending,
    /// Application refused.
    Rejected {
        /// Justification given by the administrator, when provided.
        reason: Option<String>,
    },
    /// Temporarily blocked after approval.
    Suspended {
        /// Justification given by the administrator, when provided.
        reason: Option<String>,
    },
    /// Allowed to operate the shop.
    Approved {
        /// Display name of the approving administrator, when provided.
        approved_by: Option<String>,
    },
}

impl VendorStanding {
    /// Build the standing from the backend's flat fields.
    ///
    /// Blank reason strings count as absent. A status unknown to this build
    /// is treated as `Pending`: the vendor sees the waiting panel and no
    /// operational entry points.
    #[must_use]
    pub fn from_parts(
        status: &VendorStatus,
        rejection_reason: Option<&str>,
        suspension_reason: Option<&str>,
        approved_by: Option<&str>,
    ) -> Self {
        let present = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(ToString::to_string)
        };

        match status {
            VendorStatus::Pending | VendorStatus::Unknown(_) => Self::Pending,
            VendorStatus::Rejected => Self::Rejected {
                reason: present(rejection_reason),
            },
            VendorStatus::Suspended => Self::Suspended {
                reason: present(suspension_reason).or_else(|| present(rejection_reason)),
            },
            VendorStatus::Approved => Self::Approved {
                approved_by: present(approved_by),
            },
        }
    }

    /// Flat status for this standing.
    #[must_use]
    pub const fn status(&self) -> VendorStatus {
        match self {
            Self::Pending => VendorStatus::Pending,
            Self::Rejected { .. } => VendorStatus::Rejected,
            Self::Suspended { .. } => VendorStatus::Suspended,
            Self::Approved { .. } => VendorStatus::Approved,
        }
    }

    /// Whether the vendor may use the operational dashboard.
    #[must_use]
    pub const fn allows_operations(&self) -> bool {
        matches!(self, Self::Approved { .. })
    }

    /// Whether the workflow allows moving from `self` to `target`.
    ///
    /// Transitions are performed by the backend; this mirrors its rules so the
    /// admin console only offers actions that can succeed.
    #[must_use]
    pub const fn can_transition_to(&self, target: &VendorStatus) -> bool {
        matches!(
            (self, target),
            (Self::Pending, VendorStatus::Approved | VendorStatus::Rejected)
                | (Self::Approved { .. }, VendorStatus::Suspended)
                | (Self::Suspended { .. }, VendorStatus::Approved)
        )
    }

    /// Reason text shown to the vendor or the admin, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Rejected { reason } | Self::Suspended { reason } => reason.as_deref(),
            Self::Pending | Self::Approved { .. } => None,
        }
    }
}

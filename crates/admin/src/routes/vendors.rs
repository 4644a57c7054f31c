//! Vendor approval workflow.
//!
//! The list offers only the actions the vendor's standing allows. Every
//! action posts to `/vendors/{id}/{action}`; the first submission opens a
//! confirmation or a reason dialog.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Response,
};
use souk_api::types::{Vendor, VendorStats};
use souk_core::{VendorId, VendorStanding};
use tower_sessions::Session;
use tracing::instrument;

use super::{ConfirmDialog, Confirmation, ReasonDialog, ReasonForm, confirmed_action, reason_action};
use crate::components::{DataTableConfig, vendors_table_config};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;
use crate::views::{
    Layout, ListPage, ListParams, Panel, list_query, list_return, load_list, opt_datetime,
    or_missing,
};

const LIST: &str = "admin_vendors";
const BASE: &str = "/vendors";

/// Workflow action offered on a vendor row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorAction {
    Approve,
    Reject,
    Suspend,
    Reactivate,
    Delete,
}

impl VendorAction {
    /// Actions available from `standing`.
    #[must_use]
    pub fn available(standing: &VendorStanding) -> Vec<Self> {
        match standing {
            VendorStanding::Pending => vec![Self::Approve, Self::Reject, Self::Delete],
            VendorStanding::Approved { .. } => vec![Self::Suspend, Self::Delete],
            VendorStanding::Suspended { .. } => vec![Self::Reactivate, Self::Delete],
            VendorStanding::Rejected { .. } => vec![Self::Delete],
        }
    }

    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Suspend => "suspend",
            Self::Reactivate => "reactivate",
            Self::Delete => "delete",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Approve => "Approuver",
            Self::Reject => "Rejeter",
            Self::Suspend => "Suspendre",
            Self::Reactivate => "Réactiver",
            Self::Delete => "Supprimer",
        }
    }

    #[must_use]
    pub const fn is_danger(self) -> bool {
        matches!(self, Self::Reject | Self::Suspend | Self::Delete)
    }
}

/// Vendor row view for templates.
#[derive(Debug, Clone)]
pub struct VendorRow {
    pub id: VendorId,
    pub shop_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub created_at: String,
    pub status: String,
    pub status_label: String,
    /// Rejection or suspension justification.
    pub reason: Option<String>,
    pub approved_by: Option<String>,
    pub approved_at: String,
    pub actions: Vec<VendorAction>,
}

impl From<Vendor> for VendorRow {
    fn from(vendor: Vendor) -> Self {
        let standing = vendor.standing();
        let status = standing.status();
        let approved_by = match &standing {
            VendorStanding::Approved { approved_by } => approved_by.clone(),
            _ => None,
        };

        Self {
            id: vendor.id,
            email: or_missing(vendor.contact_email()),
            phone: or_missing(vendor.phone.as_deref()),
            address: or_missing(vendor.address.as_deref()),
            created_at: opt_datetime(vendor.created_at.as_ref()),
            approved_at: opt_datetime(vendor.approved_at.as_ref()),
            status: status.as_str().to_string(),
            status_label: status.label().to_string(),
            reason: standing.reason().map(ToString::to_string),
            approved_by,
            actions: VendorAction::available(&standing),
            shop_name: vendor.shop_name,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "vendors.html")]
pub struct VendorsTemplate {
    pub layout: Layout,
    pub table: DataTableConfig,
    pub list: ListPage<VendorRow>,
    pub stats: Panel<VendorStats>,
}

/// Display the vendor list with per-status counts.
#[instrument(skip_all, fields(admin_id = %auth.admin.id))]
pub async fn index(
    State(state): State<AppState>,
    auth: RequireAdminAuth,
    session: Session,
    Query(params): Query<ListParams>,
) -> Result<VendorsTemplate> {
    let table = vendors_table_config();
    let requested = list_query(&params, &table.filter_keys());
    let api = state.api().admin(&auth.token);

    let (stats, view) = tokio::join!(
        api.vendor_stats(),
        load_list(&session, state.lists(), LIST, requested, |ticket| async move {
            let result = api.vendors(ticket.query()).await;
            (ticket, result)
        }),
    );
    let view = view?;
    let stats = Panel::load(stats, "vendor_stats")?;

    let list = ListPage::from_view(view, BASE, VendorRow::from);
    Ok(VendorsTemplate {
        layout: Layout::for_admin(&session, &auth.admin).await,
        table: table.with_values(&list.query),
        list,
        stats,
    })
}

async fn confirm_dialog(session: &Session, id: VendorId, action: VendorAction, message: String) -> ConfirmDialog {
    ConfirmDialog {
        title: format!("{} le vendeur #{id}", action.label()),
        message,
        action: format!("{BASE}/{id}/{}", action.path()),
        back: list_return(session, LIST, BASE).await,
        danger: action.is_danger(),
    }
}

async fn reason_dialog(session: &Session, id: VendorId, action: VendorAction, message: &str) -> ReasonDialog {
    ReasonDialog {
        title: format!("{} le vendeur #{id}", action.label()),
        message: message.to_string(),
        action: format!("{BASE}/{id}/{}", action.path()),
        back: list_return(session, LIST, BASE).await,
        submit_label: action.label().to_string(),
    }
}

/// Approve a pending vendor.
#[instrument(skip_all, fields(admin_id = %auth.admin.id, vendor_id = %id))]
pub async fn approve(
    State(state): State<AppState>,
    auth: RequireAdminAuth,
    session: Session,
    Path(id): Path<VendorId>,
    Form(confirmation): Form<Confirmation>,
) -> Result<Response> {
    let dialog = confirm_dialog(
        &session,
        id,
        VendorAction::Approve,
        "Le vendeur pourra publier ses produits et recevoir des commandes.".to_string(),
    )
    .await;
    let api = state.api().admin(&auth.token);
    confirmed_action(&session, dialog, confirmation, "Vendeur approuvé.", || async move {
        api.approve_vendor(id).await
    })
    .await
}

/// Reject a pending vendor with a reason.
#[instrument(skip_all, fields(admin_id = %auth.admin.id, vendor_id = %id))]
pub async fn reject(
    State(state): State<AppState>,
    auth: RequireAdminAuth,
    session: Session,
    Path(id): Path<VendorId>,
    Form(form): Form<ReasonForm>,
) -> Result<Response> {
    let dialog = reason_dialog(
        &session,
        id,
        VendorAction::Reject,
        "Ce motif sera affiché au vendeur sur son tableau de bord.",
    )
    .await;
    let api = state.api().admin(&auth.token);
    reason_action(&session, dialog, form, "Vendeur rejeté.", |reason| async move {
        api.reject_vendor(id, &reason).await
    })
    .await
}

/// Suspend an approved vendor with a reason.
#[instrument(skip_all, fields(admin_id = %auth.admin.id, vendor_id = %id))]
pub async fn suspend(
    State(state): State<AppState>,
    auth: RequireAdminAuth,
    session: Session,
    Path(id): Path<VendorId>,
    Form(form): Form<ReasonForm>,
) -> Result<Response> {
    let dialog = reason_dialog(
        &session,
        id,
        VendorAction::Suspend,
        "Le vendeur perdra l'accès à ses outils jusqu'à sa réactivation.",
    )
    .await;
    let api = state.api().admin(&auth.token);
    reason_action(&session, dialog, form, "Vendeur suspendu.", |reason| async move {
        api.suspend_vendor(id, &reason).await
    })
    .await
}

/// Lift a suspension.
#[instrument(skip_all, fields(admin_id = %auth.admin.id, vendor_id = %id))]
pub async fn reactivate(
    State(state): State<AppState>,
    auth: RequireAdminAuth,
    session: Session,
    Path(id): Path<VendorId>,
    Form(confirmation): Form<Confirmation>,
) -> Result<Response> {
    let dialog = confirm_dialog(
        &session,
        id,
        VendorAction::Reactivate,
        "Le vendeur retrouvera l'accès à son tableau de bord.".to_string(),
    )
    .await;
    let api = state.api().admin(&auth.token);
    confirmed_action(&session, dialog, confirmation, "Vendeur réactivé.", || async move {
        api.reactivate_vendor(id).await
    })
    .await
}

/// Delete a vendor account.
#[instrument(skip_all, fields(admin_id = %auth.admin.id, vendor_id = %id))]
pub async fn delete(
    State(state): State<AppState>,
    auth: RequireAdminAuth,
    session: Session,
    Path(id): Path<VendorId>,
    Form(confirmation): Form<Confirmation>,
) -> Result<Response> {
    let dialog = confirm_dialog(
        &session,
        id,
        VendorAction::Delete,
        "Cette suppression est définitive.".to_string(),
    )
    .await;
    let api = state.api().admin(&auth.token);
    confirmed_action(&session, dialog, confirmation, "Vendeur supprimé.", || async move {
        api.delete_vendor(id).await
    })
    .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use souk_core::{FetchGenerations, ListQuery, PageMeta, Paginated, VendorStatus};
    use tower_sessions::MemoryStore;

    use super::*;

    fn vendor(json: &str) -> Vendor {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_actions_follow_standing() {
        let pending = vendor(r#"{"id":1,"shop_name":"Chez Awa","status":"pending"}"#);
        assert_eq!(
            VendorRow::from(pending).actions,
            vec![VendorAction::Approve, VendorAction::Reject, VendorAction::Delete]
        );

        let suspended = vendor(
            r#"{"id":2,"shop_name":"Baobab","status":"suspended","suspension_reason":"Fraude"}"#,
        );
        let row = VendorRow::from(suspended);
        assert_eq!(row.actions, vec![VendorAction::Reactivate, VendorAction::Delete]);
        assert_eq!(row.reason.as_deref(), Some("Fraude"));
    }

    #[test]
    fn test_offered_transitions_are_allowed() {
        let target = |action: VendorAction| match action {
            VendorAction::Approve | VendorAction::Reactivate => Some(VendorStatus::Approved),
            VendorAction::Reject => Some(VendorStatus::Rejected),
            VendorAction::Suspend => Some(VendorStatus::Suspended),
            VendorAction::Delete => None,
        };

        for standing in [
            VendorStanding::Pending,
            VendorStanding::Approved { approved_by: None },
            VendorStanding::Suspended { reason: None },
            VendorStanding::Rejected { reason: None },
        ] {
            for action in VendorAction::available(&standing) {
                if let Some(status) = target(action) {
                    assert!(standing.can_transition_to(&status), "{standing:?} -> {action:?}");
                }
            }
        }
    }

    #[test]
    fn test_approved_row_shows_approver() {
        let row = VendorRow::from(vendor(
            r#"{"id":4,"shop_name":"Karité","status":"approved","approved_by":"Moussa",
                "rejection_reason":"old","user":{"id":9,"email":"karite@example.com"}}"#,
        ));
        assert_eq!(row.approved_by.as_deref(), Some("Moussa"));
        assert_eq!(row.reason, None);
        assert_eq!(row.email, "karite@example.com");
        assert_eq!(row.status_label, "Approuvé");
    }

    #[tokio::test]
    async fn test_rejected_vendor_renders_reason() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let rejected = vendor(
            r#"{"id":3,"shop_name":"Chez Awa","status":"rejected",
                "rejection_reason":"Documents incomplets"}"#,
        );
        let lists = FetchGenerations::default();
        let view = load_list(&session, &lists, LIST, ListQuery::default(), |ticket| async move {
            let meta = PageMeta {
                current_page: 1,
                last_page: 1,
                per_page: 15,
                total: 1,
            };
            (ticket, Ok(Paginated { items: vec![rejected], meta }))
        })
        .await
        .unwrap();

        let list = ListPage::from_view(view, BASE, VendorRow::from);
        let html = VendorsTemplate {
            layout: Layout::default(),
            table: vendors_table_config().with_values(&list.query),
            list,
            stats: Panel {
                data: Some(VendorStats {
                    total: 1,
                    rejected: 1,
                    ..VendorStats::default()
                }),
                error: None,
            },
        }
        .render()
        .unwrap();

        assert!(html.contains("Documents incomplets"));
        assert!(html.contains(r#"action="/vendors/3/delete""#));
        assert!(!html.contains(r#"action="/vendors/3/approve""#));
    }
}

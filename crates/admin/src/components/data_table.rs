//! Data table component types.
//!
//! Each console list describes its columns, filters and empty state once;
//! the shared partials in `templates/components/` render them.

use souk_core::ListQuery;

/// Column definition for a data table.
#[derive(Debug, Clone)]
pub struct TableColumn {
    /// Display label for the column header.
    pub label: String,
    /// Right-aligned (amounts, counts).
    pub numeric: bool,
}

impl TableColumn {
    #[must_use]
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            numeric: false,
        }
    }

    #[must_use]
    pub fn numeric(label: &str) -> Self {
        Self {
            label: label.to_string(),
            numeric: true,
        }
    }
}

/// Filter type for data tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    /// Free-text search input.
    Text,
    /// Single-select dropdown.
    Select,
}

/// Option for select filters.
#[derive(Debug, Clone)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Filter definition for a data table.
#[derive(Debug, Clone)]
pub struct TableFilter {
    /// Query parameter key.
    pub key: String,
    pub label: String,
    pub filter_type: FilterType,
    pub placeholder: String,
    pub options: Vec<FilterOption>,
    /// Current value (text filters).
    pub value: String,
}

impl TableFilter {
    /// Create a text filter.
    #[must_use]
    pub fn text(key: &str, label: &str, placeholder: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            filter_type: FilterType::Text,
            placeholder: placeholder.to_string(),
            options: Vec::new(),
            value: String::new(),
        }
    }

    /// Create a select filter over `(wire value, label)` pairs.
    #[must_use]
    pub fn select<'a>(key: &str, label: &str, options: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            filter_type: FilterType::Select,
            placeholder: String::new(),
            options: options
                .into_iter()
                .map(|(value, label)| FilterOption {
                    value: value.to_string(),
                    label: label.to_string(),
                    selected: false,
                })
                .collect(),
            value: String::new(),
        }
    }

    #[must_use]
    pub fn is_select(&self) -> bool {
        self.filter_type == FilterType::Select
    }
}

/// Configuration for a data table.
#[derive(Debug, Clone)]
pub struct DataTableConfig {
    /// Unique table identifier, also the HTMX swap target.
    pub table_id: String,
    /// Page the filters submit to.
    pub base_path: String,
    pub columns: Vec<TableColumn>,
    pub filters: Vec<TableFilter>,
    /// Title for empty state.
    pub empty_title: String,
    /// Description for empty state.
    pub empty_description: Option<String>,
}

impl DataTableConfig {
    #[must_use]
    pub fn new(table_id: &str, base_path: &str) -> Self {
        Self {
            table_id: table_id.to_string(),
            base_path: base_path.to_string(),
            columns: Vec::new(),
            filters: Vec::new(),
            empty_title: "Aucun élément".to_string(),
            empty_description: None,
        }
    }

    #[must_use]
    pub fn column(mut self, column: TableColumn) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: TableFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set empty state configuration.
    #[must_use]
    pub fn empty_state(mut self, title: &str, description: Option<&str>) -> Self {
        self.empty_title = title.to_string();
        self.empty_description = description.map(ToString::to_string);
        self
    }

    /// Query keys the table filters on.
    #[must_use]
    pub fn filter_keys(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.key.as_str()).collect()
    }

    /// Reflect the active filters of `query` in the inputs.
    #[must_use]
    pub fn with_values(mut self, query: &ListQuery) -> Self {
        for filter in &mut self.filters {
            let current = query.filter(&filter.key).unwrap_or_default();
            filter.value = current.to_string();
            for option in &mut filter.options {
                option.selected = option.value == current;
            }
        }
        self
    }

    /// Column count, for full-width cells.
    #[must_use]
    pub fn span(&self) -> usize {
        self.columns.len()
    }
}

/// Status options of a `define_status!` enum.
fn status_pairs<S>(all: &'static [S], wire: fn(&S) -> &str, label: fn(&S) -> &str) -> Vec<(&'static str, &'static str)> {
    all.iter().map(|s| (wire(s), label(s))).collect()
}

/// Build the vendors table configuration.
#[must_use]
pub fn vendors_table_config() -> DataTableConfig {
    use souk_core::VendorStatus;

    DataTableConfig::new("vendors", "/vendors")
        .column(TableColumn::new("Boutique"))
        .column(TableColumn::new("Contact"))
        .column(TableColumn::new("Inscrit le"))
        .column(TableColumn::new("Statut"))
        .column(TableColumn::new("Actions"))
        .filter(TableFilter::select(
            "status",
            "Statut",
            status_pairs(VendorStatus::ALL, VendorStatus::as_str, VendorStatus::label),
        ))
        .filter(TableFilter::text("search", "Recherche", "Nom, e-mail…"))
        .empty_state("Aucun vendeur", Some("Essayez d'autres filtres."))
}

/// Build the payments table configuration.
#[must_use]
pub fn payments_table_config() -> DataTableConfig {
    use souk_core::PaymentStatus;

    DataTableConfig::new("payments", "/payments")
        .column(TableColumn::new("Paiement"))
        .column(TableColumn::new("Client"))
        .column(TableColumn::new("Partenaire"))
        .column(TableColumn::new("Code"))
        .column(TableColumn::numeric("Montant"))
        .column(TableColumn::new("Statut"))
        .column(TableColumn::new("Actions"))
        .filter(TableFilter::select(
            "status",
            "Statut",
            status_pairs(PaymentStatus::ALL, PaymentStatus::as_str, PaymentStatus::label),
        ))
        .filter(TableFilter::text("search", "Recherche", "Client, code…"))
        .empty_state("Aucun paiement", Some("Aucun paiement ne correspond à ces critères."))
}

/// Build the payment codes table configuration.
#[must_use]
pub fn payment_codes_table_config() -> DataTableConfig {
    use souk_core::PaymentCodeStatus;

    DataTableConfig::new("payment-codes", "/payment-codes")
        .column(TableColumn::new("Code"))
        .column(TableColumn::new("Commande"))
        .column(TableColumn::new("Partenaire"))
        .column(TableColumn::numeric("Montant"))
        .column(TableColumn::new("Expire le"))
        .column(TableColumn::new("Utilisé le"))
        .column(TableColumn::new("Statut"))
        .filter(TableFilter::select(
            "status",
            "Statut",
            status_pairs(
                PaymentCodeStatus::ALL,
                PaymentCodeStatus::as_str,
                PaymentCodeStatus::label,
            ),
        ))
        .empty_state("Aucun code de paiement", None)
}

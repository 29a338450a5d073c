//! # Access Control
//!
//! Every role decision in the app goes through [`can`].
//!
//! ```text
//! Action                 Admin   Cashier
//! ─────────────────────  ─────   ───────
//! ViewCatalog              ✓        ✓
//! ManageProducts           ✓
//! RecordSale               ✓        ✓
//! ViewSales                ✓
//! ManageCustomers          ✓        ✓
//! RecordExpense            ✓        ✓
//! ViewExpenses             ✓
//! ViewDashboard            ✓        ✓
//! ViewReports              ✓
//! ReadSettings             ✓        ✓
//! UpdateSettings           ✓
//! ManageUsers              ✓
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::Role;

/// Something an operator may attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Action {
    ViewCatalog,
    ManageProducts,
    RecordSale,
    ViewSales,
    ManageCustomers,
    RecordExpense,
    ViewExpenses,
    ViewDashboard,
    ViewReports,
    ReadSettings,
    UpdateSettings,
    ManageUsers,
}

/// Whether `role` may perform `action`.
pub fn can(role: Role, action: Action) -> bool {
    match role {
        Role::Admin => true,
        Role::Cashier => matches!(
            action,
            Action::ViewCatalog
                | Action::RecordSale
                | Action::ManageCustomers
                | Action::RecordExpense
                | Action::ViewDashboard
                | Action::ReadSettings
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Action; 12] = [
        Action::ViewCatalog,
        Action::ManageProducts,
        Action::RecordSale,
        Action::ViewSales,
        Action::ManageCustomers,
        Action::RecordExpense,
        Action::ViewExpenses,
        Action::ViewDashboard,
        Action::ViewReports,
        Action::ReadSettings,
        Action::UpdateSettings,
        Action::ManageUsers,
    ];

    #[test]
    fn test_admin_can_do_everything() {
        assert!(ALL.iter().all(|a| can(Role::Admin, *a)));
    }

    #[test]
    fn test_cashier_capabilities() {
        assert!(can(Role::Cashier, Action::RecordSale));
        assert!(can(Role::Cashier, Action::ManageCustomers));
        assert!(can(Role::Cashier, Action::ReadSettings));

        assert!(!can(Role::Cashier, Action::ManageProducts));
        assert!(!can(Role::Cashier, Action::ViewReports));
        assert!(!can(Role::Cashier, Action::UpdateSettings));
        assert!(!can(Role::Cashier, Action::ManageUsers));
    }
}

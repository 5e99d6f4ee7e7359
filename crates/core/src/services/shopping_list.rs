//! Shopping list aggregation.
//!
//! Sums the ingredient amounts of every recipe in a user's cart. Lines are
//! grouped by ingredient name and measurement unit, never by row id, so the
//! same ingredient listed with two units yields two lines.

use std::collections::BTreeMap;

use foodgram_common::AppResult;
use foodgram_db::repositories::{CartIngredientRow, ShoppingCartRepository};

/// Text rendered for an empty cart.
pub const EMPTY_SHOPPING_LIST: &str = "Shopping list is empty.";

/// File name offered when the list is downloaded.
pub const SHOPPING_LIST_FILENAME: &str = "shopping_list.txt";

/// One aggregated line of the shopping list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListLine {
    pub name: String,
    pub measurement_unit: String,
    pub total: i64,
}

/// Group rows by (name, unit) and sum amounts, sorted by name then unit.
#[must_use]
pub fn aggregate(rows: impl IntoIterator<Item = CartIngredientRow>) -> Vec<ShoppingListLine> {
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
    for row in rows {
        *totals.entry((row.name, row.measurement_unit)).or_insert(0) += i64::from(row.amount);
    }

    totals
        .into_iter()
        .map(|((name, measurement_unit), total)| ShoppingListLine {
            name,
            measurement_unit,
            total,
        })
        .collect()
}

/// Render lines as `"{name} ({unit}) \u{2014} {total}"`, one per line.
#[must_use]
pub fn render(lines: &[ShoppingListLine]) -> String {
    if lines.is_empty() {
        return EMPTY_SHOPPING_LIST.to_string();
    }

    lines
        .iter()
        .map(|l| format!("{} ({}) \u{2014} {}", l.name, l.measurement_unit, l.total))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Shopping list service. Read-only.
#[derive(Clone)]
pub struct ShoppingListService {
    cart_repo: ShoppingCartRepository,
}

impl ShoppingListService {
    /// Create a new shopping list service.
    #[must_use]
    pub const fn new(cart_repo: ShoppingCartRepository) -> Self {
        Self { cart_repo }
    }

    /// Aggregated lines for the user's cart.
    pub async fn lines(&self, user_id: &str) -> AppResult<Vec<ShoppingListLine>> {
        let rows = self.cart_repo.ingredient_rows(user_id).await?;
        Ok(aggregate(rows))
    }

    /// The rendered shopping list for the user's cart.
    pub async fn render_for(&self, user_id: &str) -> AppResult<String> {
        let lines = self.lines(user_id).await?;
        tracing::debug!(user_id = %user_id, lines = lines.len(), "Shopping list built");
        Ok(render(&lines))
    }
}

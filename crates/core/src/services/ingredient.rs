//! Ingredient service.

use foodgram_common::{AppError, AppResult, IdGenerator};
use foodgram_db::{entities::ingredient, repositories::IngredientRepository};
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// Ingredient reference entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngredientView {
    pub id: String,
    pub name: String,
    pub measurement_unit: String,
}

impl From<ingredient::Model> for IngredientView {
    fn from(model: ingredient::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            measurement_unit: model.measurement_unit,
        }
    }
}

/// One entry of a bulk ingredient import.
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientSeed {
    pub name: String,
    pub measurement_unit: String,
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub created: usize,
    pub skipped: usize,
}

/// Read access to the ingredient catalogue plus bulk loading.
#[derive(Clone)]
pub struct IngredientService {
    ingredient_repo: IngredientRepository,
    id_gen: IdGenerator,
}

impl IngredientService {
    /// Create a new ingredient service.
    #[must_use]
    pub const fn new(ingredient_repo: IngredientRepository) -> Self {
        Self {
            ingredient_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List ingredients, optionally by case-insensitive name prefix.
    pub async fn list(&self, name_prefix: Option<&str>) -> AppResult<Vec<IngredientView>> {
        let rows = self.ingredient_repo.list(name_prefix).await?;
        Ok(rows.into_iter().map(IngredientView::from).collect())
    }

    /// Get an ingredient by ID.
    pub async fn get(&self, id: &str) -> AppResult<IngredientView> {
        self.ingredient_repo
            .find_by_id(id)
            .await?
            .map(IngredientView::from)
            .ok_or_else(|| AppError::NotFound(format!("Ingredient {id}")))
    }

    /// Insert seed entries, skipping (name, unit) pairs that already exist
    /// and entries with a blank name or unit.
    pub async fn import(&self, seeds: Vec<IngredientSeed>) -> AppResult<ImportReport> {
        let mut report = ImportReport::default();

        for seed in seeds {
            let name = seed.name.trim();
            let unit = seed.measurement_unit.trim();
            if name.is_empty() || unit.is_empty() {
                tracing::warn!(name = %seed.name, "Skipping ingredient with blank field");
                report.skipped += 1;
                continue;
            }

            let model = ingredient::ActiveModel {
                id: Set(self.id_gen.generate()),
                name: Set(name.to_string()),
                measurement_unit: Set(unit.to_string()),
            };

            if self.ingredient_repo.insert_if_absent(model).await? {
                report.created += 1;
            } else {
                report.skipped += 1;
            }
        }

        tracing::info!(
            created = report.created,
            skipped = report.skipped,
            "Ingredient import finished"
        );

        Ok(report)
    }
}

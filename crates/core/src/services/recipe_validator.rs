//! Recipe authoring rules.
//!
//! Structural checks run in a fixed order so the first failing field is
//! reported deterministically. Reference existence is checked afterwards by
//! [`RecipeService`](super::RecipeService) because it needs the database.

use std::collections::HashSet;

use foodgram_common::{AppError, AppResult, PartialUpdatePolicy, RecipeLimits, error::reason};
use validator::Validate;

use super::recipe::{CreateRecipeInput, RecipeIngredientInput, UpdateRecipeInput};

/// Validate a new recipe.
pub fn validate_create(input: &CreateRecipeInput, limits: &RecipeLimits) -> AppResult<()> {
    input.validate()?;
    check_ingredients(&input.ingredients, limits)?;
    check_tags(&input.tags)?;
    check_cooking_time(input.cooking_time, limits)
}

/// Validate a recipe update.
///
/// Omitted ingredient or tag lists are rejected unless the limits say to
/// preserve existing associations.
pub fn validate_update(input: &UpdateRecipeInput, limits: &RecipeLimits) -> AppResult<()> {
    input.validate()?;

    let preserve = limits.partial_update == PartialUpdatePolicy::Preserve;

    match &input.ingredients {
        Some(ingredients) => check_ingredients(ingredients, limits)?,
        None if !preserve => return Err(AppError::validation("ingredients", reason::REQUIRED)),
        None => {}
    }

    match &input.tags {
        Some(tags) => check_tags(tags)?,
        None if !preserve => return Err(AppError::validation("tags", reason::REQUIRED)),
        None => {}
    }

    if let Some(minutes) = input.cooking_time {
        check_cooking_time(minutes, limits)?;
    }

    Ok(())
}

/// Non-empty, no repeated ingredient, every amount within bounds.
pub fn check_ingredients(
    ingredients: &[RecipeIngredientInput],
    limits: &RecipeLimits,
) -> AppResult<()> {
    if ingredients.is_empty() {
        return Err(AppError::validation("ingredients", reason::REQUIRED));
    }

    let mut seen = HashSet::with_capacity(ingredients.len());
    if !ingredients.iter().all(|i| seen.insert(i.id.as_str())) {
        return Err(AppError::validation("ingredients", reason::DUPLICATE));
    }

    if ingredients.iter().any(|i| !limits.amount_in_range(i.amount)) {
        return Err(AppError::validation("ingredients", reason::OUT_OF_RANGE));
    }

    Ok(())
}

/// Non-empty, no repeated tag.
pub fn check_tags(tags: &[String]) -> AppResult<()> {
    if tags.is_empty() {
        return Err(AppError::validation("tags", reason::REQUIRED));
    }

    let mut seen = HashSet::with_capacity(tags.len());
    if !tags.iter().all(|t| seen.insert(t.as_str())) {
        return Err(AppError::validation("tags", reason::DUPLICATE));
    }

    Ok(())
}

/// Cooking time within the configured minutes.
pub fn check_cooking_time(minutes: i64, limits: &RecipeLimits) -> AppResult<()> {
    if limits.cooking_time_in_range(minutes) {
        Ok(())
    } else {
        Err(AppError::validation("cooking_time", reason::OUT_OF_RANGE))
    }
}

/// Narrow a range-checked value to its column type.
pub fn narrow(value: i64, field: &str) -> AppResult<i32> {
    i32::try_from(value).map_err(|_| AppError::validation(field, reason::OUT_OF_RANGE))
}

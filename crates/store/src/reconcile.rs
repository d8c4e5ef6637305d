//! Reconciliation of category visibility preferences.
//!
//! The category universe changes between sessions (new custom categories,
//! new defaults in the catalog), so the persisted preference set is merged
//! against the current categories on every initialisation:
//!
//! - a persisted preference for a default category is forced back to
//!   `enabled`;
//! - a category with no preference gets one, enabled only if it is a default;
//! - with no persisted set at all, only default categories get a (enabled)
//!   preference and every other category stays hidden until the user opts in.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::{Catalog, ExpenseCategory, UserCategoryPreference};

/// Where the persisted preference set was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceSource {
    Remote,
    /// Local fallback cache; its records are unknown to the remote store.
    Cache,
    /// Nothing persisted anywhere: first run for this user.
    Empty,
}

/// One step of a reconciliation plan.
#[derive(Debug, Clone, PartialEq)]
pub enum PreferenceAction {
    /// Persisted record kept as is.
    Keep(UserCategoryPreference),
    /// Persisted record of a default category, re-enabled.
    Heal(UserCategoryPreference),
    /// New record for a category that had none.
    Create { category_id: Uuid, enabled: bool },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilePlan {
    pub actions: Vec<PreferenceAction>,
}

impl ReconcilePlan {
    pub fn healed(&self) -> usize {
        self.actions
            .iter()
            .filter(|action| matches!(action, PreferenceAction::Heal(_)))
            .count()
    }

    pub fn created(&self) -> usize {
        self.actions
            .iter()
            .filter(|action| matches!(action, PreferenceAction::Create { .. }))
            .count()
    }

    /// Whether persisting the plan changes nothing on the remote side.
    pub fn is_unchanged(&self) -> bool {
        self.actions
            .iter()
            .all(|action| matches!(action, PreferenceAction::Keep(_)))
    }
}

/// Merge `persisted` preferences against the current `categories`.
///
/// Actions follow the order of `persisted`, then the order of `categories`
/// for synthesised records.
pub fn reconcile(
    persisted: &[UserCategoryPreference],
    categories: &[ExpenseCategory],
    catalog: &Catalog,
) -> ReconcilePlan {
    if persisted.is_empty() {
        let actions = categories
            .iter()
            .filter(|category| catalog.is_default(category))
            .map(|category| PreferenceAction::Create {
                category_id: category.id,
                enabled: true,
            })
            .collect();
        return ReconcilePlan { actions };
    }

    let by_id: HashMap<Uuid, &ExpenseCategory> = categories
        .iter()
        .map(|category| (category.id, category))
        .collect();

    let mut actions = Vec::with_capacity(persisted.len().max(categories.len()));
    for preference in persisted {
        let is_default = by_id
            .get(&preference.category_id)
            .is_some_and(|category| catalog.is_default(category));
        if is_default && !preference.enabled {
            let mut healed = preference.clone();
            healed.enabled = true;
            actions.push(PreferenceAction::Heal(healed));
        } else {
            actions.push(PreferenceAction::Keep(preference.clone()));
        }
    }

    let covered: HashSet<Uuid> = persisted.iter().map(|p| p.category_id).collect();
    actions.extend(
        categories
            .iter()
            .filter(|category| !covered.contains(&category.id))
            .map(|category| PreferenceAction::Create {
                category_id: category.id,
                enabled: catalog.is_default(category),
            }),
    );

    ReconcilePlan { actions }
}

/// Categories with an enabled preference, in category order, without duplicates.
pub fn selected_categories<'a>(
    categories: &'a [ExpenseCategory],
    preferences: &[UserCategoryPreference],
) -> Vec<&'a ExpenseCategory> {
    let enabled: HashSet<Uuid> = preferences
        .iter()
        .filter(|preference| preference.enabled)
        .map(|preference| preference.category_id)
        .collect();
    let mut seen = HashSet::new();
    categories
        .iter()
        .filter(|category| enabled.contains(&category.id) && seen.insert(category.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn category(name: &str, key: Option<&str>) -> ExpenseCategory {
        ExpenseCategory {
            id: Uuid::new_v4(),
            name: name.to_string(),
            color: "#111111".to_string(),
            icon: None,
            builtin_key: key.map(ToString::to_string),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn preference(category: &ExpenseCategory, enabled: bool) -> UserCategoryPreference {
        UserCategoryPreference {
            id: Uuid::new_v4(),
            user_id: "alice".to_string(),
            category_id: category.id,
            enabled,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn first_run_enables_only_defaults() {
        let food = category("Food", Some("food"));
        let toys = category("Toys", Some("toys"));
        let custom = category("Aquarium", None);

        let plan = reconcile(&[], &[food.clone(), toys, custom], &Catalog::default());

        assert_eq!(
            plan.actions,
            vec![PreferenceAction::Create {
                category_id: food.id,
                enabled: true
            }]
        );
    }

    #[test]
    fn defaults_heal_to_enabled() {
        let vet = category("Veterinary", None);
        let toys = category("Toys", Some("toys"));
        let persisted = vec![preference(&vet, false), preference(&toys, false)];

        let plan = reconcile(&persisted, &[vet.clone(), toys], &Catalog::default());

        assert_eq!(plan.healed(), 1);
        match &plan.actions[0] {
            PreferenceAction::Heal(p) => {
                assert_eq!(p.category_id, vet.id);
                assert!(p.enabled);
                assert_eq!(p.id, persisted[0].id);
            }
            other => panic!("unexpected action {other:?}"),
        }
        assert_eq!(plan.actions[1], PreferenceAction::Keep(persisted[1].clone()));
    }

    #[test]
    fn new_categories_are_synthesised() {
        let food = category("Food", Some("food"));
        let grooming = category("Grooming", Some("grooming"));
        let custom = category("Agility", None);
        let persisted = vec![preference(&food, true)];

        let plan = reconcile(
            &persisted,
            &[food, grooming.clone(), custom.clone()],
            &Catalog::default(),
        );

        assert_eq!(plan.created(), 2);
        assert!(plan.actions.contains(&PreferenceAction::Create {
            category_id: grooming.id,
            enabled: true
        }));
        assert!(plan.actions.contains(&PreferenceAction::Create {
            category_id: custom.id,
            enabled: false
        }));
    }

    #[test]
    fn up_to_date_set_is_unchanged() {
        let food = category("Food", Some("food"));
        let toys = category("Toys", Some("toys"));
        let persisted = vec![preference(&food, true), preference(&toys, false)];

        let plan = reconcile(&persisted, &[food, toys], &Catalog::default());

        assert!(plan.is_unchanged());
    }

    #[test]
    fn preferences_of_vanished_categories_are_kept() {
        let food = category("Food", Some("food"));
        let gone = category("Gone", None);
        let persisted = vec![preference(&gone, true)];

        let plan = reconcile(&persisted, &[food], &Catalog::default());

        assert_eq!(plan.actions[0], PreferenceAction::Keep(persisted[0].clone()));
        assert_eq!(plan.created(), 1);
    }

    #[test]
    fn selection_follows_category_order_without_duplicates() {
        let a = category("A", None);
        let b = category("B", None);
        let c = category("C", None);
        let categories = vec![a.clone(), b.clone(), c.clone()];
        let preferences = vec![
            preference(&c, true),
            preference(&a, true),
            preference(&a, true),
            preference(&b, false),
        ];

        let selected: Vec<Uuid> = selected_categories(&categories, &preferences)
            .into_iter()
            .map(|category| category.id)
            .collect();

        assert_eq!(selected, vec![a.id, c.id]);
    }
}

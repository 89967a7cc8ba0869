//! Tests for the allocation editor.

use std::collections::BTreeMap;

use proptest::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tripbudget_shared::types::DestinationId;
use tripbudget_shared::{EditorConfig, NonNumericInput};

use super::error::EditorError;
use super::session::AllocationEditor;
use super::types::{AllocationGroup, AllocationKey, InputUnit};
use crate::budget::{BudgetDefinition, CostCategory};
use crate::location::{Country, Destination, DestinationDirectory};

fn japan() -> AllocationKey {
    AllocationKey::Country(Country::new("Japan"))
}

fn korea() -> AllocationKey {
    AllocationKey::Country(Country::new("Korea"))
}

fn flight() -> AllocationKey {
    AllocationKey::Category(CostCategory::Flight)
}

fn sample_budget() -> BudgetDefinition {
    let mut budget = BudgetDefinition::new(dec!(3000));
    budget
        .budgets_by_category
        .insert(CostCategory::Flight, dec!(1200));
    budget
        .budgets_by_category
        .insert(CostCategory::Food, dec!(450));
    budget
        .budgets_by_country
        .insert(Country::new("Japan"), dec!(1400));
    budget.contingency_pct = dec!(10);
    budget
}

fn sample_days() -> BTreeMap<Country, u32> {
    BTreeMap::from([(Country::new("Japan"), 7), (Country::new("Korea"), 4)])
}

fn editor() -> AllocationEditor {
    AllocationEditor::new(&sample_budget(), &sample_days(), EditorConfig::default())
}

#[test]
fn test_initial_state() {
    let editor = editor();
    assert_eq!(editor.mode(AllocationGroup::Category), InputUnit::Dollars);
    assert_eq!(editor.mode(AllocationGroup::Country), InputUnit::Dollars);
    assert_eq!(editor.keys(AllocationGroup::Category).len(), CostCategory::ALL.len());
    assert_eq!(editor.keys(AllocationGroup::Country), vec![japan(), korea()]);
    assert_eq!(editor.amount(&korea()).unwrap(), Decimal::ZERO);
    assert!(!editor.is_dirty());
}

#[test]
fn test_mode_switch_changes_display_only() {
    let mut editor = editor();

    editor
        .set_mode(AllocationGroup::Country, InputUnit::Percent)
        .unwrap();
    let shown = editor.display(&japan()).unwrap();
    assert_eq!(shown.unit, InputUnit::Percent);
    assert_eq!(shown.value, dec!(46.7));

    editor
        .set_mode(AllocationGroup::Country, InputUnit::PerDay)
        .unwrap();
    assert_eq!(editor.display(&japan()).unwrap().value, dec!(200));

    editor
        .set_mode(AllocationGroup::Country, InputUnit::Dollars)
        .unwrap();
    assert_eq!(editor.display(&japan()).unwrap().value, dec!(1400));
    assert_eq!(editor.amount(&japan()).unwrap(), dec!(1400));
    // The category group is unaffected.
    assert_eq!(editor.mode(AllocationGroup::Category), InputUnit::Dollars);
}

#[test]
fn test_category_has_no_per_day_unit() {
    let mut editor = editor();
    editor
        .set_mode(AllocationGroup::Category, InputUnit::Percent)
        .unwrap();

    let err = editor
        .set_mode(AllocationGroup::Category, InputUnit::PerDay)
        .unwrap_err();
    assert!(matches!(
        err,
        EditorError::UnitUnavailable {
            group: AllocationGroup::Category,
            unit: InputUnit::PerDay
        }
    ));
    assert_eq!(editor.mode(AllocationGroup::Category), InputUnit::Percent);
    assert!(editor.display_in(&flight(), InputUnit::PerDay).is_err());
}

#[test]
fn test_set_value_in_each_unit() {
    let mut editor = editor();

    editor
        .set_mode(AllocationGroup::Country, InputUnit::PerDay)
        .unwrap();
    assert_eq!(editor.set_value(&korea(), "150").unwrap(), dec!(600));
    assert_eq!(editor.display(&korea()).unwrap().value, dec!(150));
    assert_eq!(
        editor.display_in(&korea(), InputUnit::Percent).unwrap().value,
        dec!(20)
    );
    assert_eq!(
        editor.display_in(&korea(), InputUnit::Dollars).unwrap().value,
        dec!(600)
    );

    editor
        .set_mode(AllocationGroup::Category, InputUnit::Percent)
        .unwrap();
    assert_eq!(editor.set_value(&flight(), "12.5%").unwrap(), dec!(375));

    editor
        .set_mode(AllocationGroup::Category, InputUnit::Dollars)
        .unwrap();
    assert_eq!(editor.set_value(&flight(), "$1,000").unwrap(), dec!(1000));
    assert!(editor.is_dirty());
}

#[test]
fn test_zero_days_and_zero_total_do_not_fault() {
    let mut budget = sample_budget();
    budget.total_budget_usd = Decimal::ZERO;
    let days = BTreeMap::from([(Country::new("Japan"), 0)]);
    let mut editor = AllocationEditor::new(&budget, &days, EditorConfig::default());

    editor
        .set_mode(AllocationGroup::Country, InputUnit::PerDay)
        .unwrap();
    assert_eq!(editor.display(&japan()).unwrap().value, Decimal::ZERO);
    assert_eq!(editor.set_value(&japan(), "80").unwrap(), Decimal::ZERO);

    editor
        .set_mode(AllocationGroup::Category, InputUnit::Percent)
        .unwrap();
    assert_eq!(editor.display(&flight()).unwrap().value, Decimal::ZERO);
    assert_eq!(
        editor.summary(AllocationGroup::Category).percentage,
        Decimal::ZERO
    );
}

#[test]
fn test_summary_surfaces_over_allocation() {
    let mut editor = editor();
    editor.set_value(&korea(), "2000").unwrap();

    let summary = editor.summary(AllocationGroup::Country);
    assert_eq!(summary.total_allocated, dec!(3400));
    assert_eq!(summary.unallocated, dec!(-400));
    assert_eq!(summary.percentage, dec!(113.33));

    let categories = editor.summary(AllocationGroup::Category);
    assert_eq!(categories.total_allocated, dec!(1650));
    assert_eq!(categories.unallocated, dec!(1350));
}

#[test]
fn test_completeness_follows_typed_percentages() {
    let budget = BudgetDefinition::new(dec!(1000));
    let days = BTreeMap::from([
        (Country::new("Chile"), 5),
        (Country::new("Peru"), 5),
        (Country::new("Bolivia"), 5),
    ]);
    let mut editor = AllocationEditor::new(&budget, &days, EditorConfig::default());
    assert!(editor.completeness(AllocationGroup::Country).is_none());

    editor
        .set_mode(AllocationGroup::Country, InputUnit::Percent)
        .unwrap();
    for country in ["Chile", "Peru", "Bolivia"] {
        editor
            .set_value(&AllocationKey::Country(Country::new(country)), "33.3")
            .unwrap();
    }

    let completeness = editor.completeness(AllocationGroup::Country).unwrap();
    assert_eq!(completeness.allocated_percent, dec!(99.9));
    assert_eq!(completeness.remaining_percent, dec!(0.1));
    assert!(!completeness.is_complete());

    editor
        .set_value(&AllocationKey::Country(Country::new("Bolivia")), "33.4")
        .unwrap();
    let completeness = editor.completeness(AllocationGroup::Country).unwrap();
    assert!(completeness.is_complete());
    assert_eq!(
        editor.summary(AllocationGroup::Country).unallocated,
        Decimal::ZERO
    );

    editor
        .set_value(&AllocationKey::Country(Country::new("Bolivia")), "50")
        .unwrap();
    let completeness = editor.completeness(AllocationGroup::Country).unwrap();
    assert_eq!(completeness.remaining_percent, dec!(-16.6));
}

#[test]
fn test_non_numeric_input_rejected_by_default() {
    let mut editor = editor();
    let err = editor.set_value(&flight(), "lots").unwrap_err();
    assert!(matches!(err, EditorError::InvalidNumber(_)));
    assert_eq!(editor.amount(&flight()).unwrap(), dec!(1200));
    assert!(!editor.is_dirty());
}

#[test]
fn test_non_numeric_input_as_zero() {
    let config = EditorConfig {
        non_numeric_input: NonNumericInput::Zero,
    };
    let mut editor = AllocationEditor::new(&sample_budget(), &sample_days(), config);
    assert_eq!(editor.set_value(&flight(), "lots").unwrap(), Decimal::ZERO);
    assert_eq!(editor.amount(&flight()).unwrap(), Decimal::ZERO);
}

#[test]
fn test_percent_overflow_rejected() {
    let mut editor = editor();
    editor
        .set_mode(AllocationGroup::Category, InputUnit::Percent)
        .unwrap();

    let err = editor
        .set_value(&flight(), &Decimal::MAX.to_string())
        .unwrap_err();

    assert!(matches!(err, EditorError::OutOfRange(value) if value == Decimal::MAX));
    assert_eq!(editor.amount(&flight()).unwrap(), dec!(1200));
    assert_eq!(editor.display(&flight()).unwrap().value, dec!(40));
    assert!(!editor.is_dirty());
}

#[test]
fn test_per_day_overflow_rejected() {
    let mut editor = editor();
    editor
        .set_mode(AllocationGroup::Country, InputUnit::PerDay)
        .unwrap();

    let err = editor
        .set_value(&japan(), &Decimal::MAX.to_string())
        .unwrap_err();

    assert!(matches!(err, EditorError::OutOfRange(_)));
    assert_eq!(editor.amount(&japan()).unwrap(), dec!(1400));
    assert!(!editor.is_dirty());
}

#[test]
fn test_group_total_overflow_rejected() {
    let food = AllocationKey::Category(CostCategory::Food);
    let mut editor = editor();
    editor.set_value(&food, "0").unwrap();
    editor
        .set_value(&flight(), &Decimal::MAX.to_string())
        .unwrap();

    let err = editor.set_value(&food, "1").unwrap_err();
    assert!(matches!(err, EditorError::OutOfRange(_)));
    assert_eq!(editor.amount(&food).unwrap(), Decimal::ZERO);

    let summary = editor.summary(AllocationGroup::Category);
    assert_eq!(summary.total_allocated, Decimal::MAX);
    assert_eq!(summary.unallocated, dec!(3000) - Decimal::MAX);
}

#[test]
fn test_summary_saturates_on_loaded_budget() {
    let mut budget = BudgetDefinition::new(dec!(3000));
    budget
        .budgets_by_category
        .insert(CostCategory::Flight, Decimal::MAX);
    budget
        .budgets_by_category
        .insert(CostCategory::Food, Decimal::MAX);
    let mut editor = AllocationEditor::new(&budget, &BTreeMap::new(), EditorConfig::default());

    assert_eq!(
        editor.summary(AllocationGroup::Category).total_allocated,
        Decimal::MAX
    );
    editor
        .set_mode(AllocationGroup::Category, InputUnit::Percent)
        .unwrap();
    let completeness = editor.completeness(AllocationGroup::Category).unwrap();
    assert!(completeness.allocated_percent > Decimal::ONE_HUNDRED);
    assert!(!completeness.is_complete());
}

#[test]
fn test_unknown_country() {
    let mut editor = editor();
    let peru = AllocationKey::Country(Country::new("Peru"));
    assert!(matches!(
        editor.set_value(&peru, "10"),
        Err(EditorError::UnknownItem(_))
    ));

    editor.add_country(Country::new("Peru"), 3);
    editor
        .set_mode(AllocationGroup::Country, InputUnit::PerDay)
        .unwrap();
    assert_eq!(editor.set_value(&peru, "100").unwrap(), dec!(300));
}

#[test]
fn test_total_change_refreshes_percent_display() {
    let mut editor = editor();
    editor
        .set_mode(AllocationGroup::Category, InputUnit::Percent)
        .unwrap();
    editor.set_value(&flight(), "40").unwrap();
    assert_eq!(editor.display(&flight()).unwrap().value, dec!(40));

    editor.set_total_budget("6000").unwrap();
    assert_eq!(editor.amount(&flight()).unwrap(), dec!(1200));
    assert_eq!(editor.display(&flight()).unwrap().value, dec!(20));
    assert_eq!(editor.total_budget(), dec!(6000));
}

#[test]
fn test_save_emits_canonical_amounts() {
    let mut editor = editor();
    editor
        .set_mode(AllocationGroup::Category, InputUnit::Percent)
        .unwrap();
    editor.set_value(&flight(), "33.3333").unwrap();
    editor
        .set_value(&AllocationKey::Category(CostCategory::Food), "0")
        .unwrap();
    editor
        .set_mode(AllocationGroup::Country, InputUnit::PerDay)
        .unwrap();
    editor.set_value(&korea(), "125").unwrap();
    editor.set_note(&korea(), "  Seoul and Busan ").unwrap();
    editor.set_group_note(AllocationGroup::Category, "rough split");
    editor.set_contingency("15").unwrap();

    let budget = editor.save();

    assert_eq!(budget.total_budget_usd, dec!(3000));
    assert_eq!(budget.budgets_by_category[&CostCategory::Flight], dec!(1000));
    // Zeroed but present in the loaded budget.
    assert_eq!(budget.budgets_by_category[&CostCategory::Food], Decimal::ZERO);
    // Never allocated.
    assert!(!budget.budgets_by_category.contains_key(&CostCategory::Other));
    assert_eq!(budget.budgets_by_country[&Country::new("Japan")], dec!(1400));
    assert_eq!(budget.budgets_by_country[&Country::new("Korea")], dec!(500));
    assert_eq!(budget.country_notes[&Country::new("Korea")], "Seoul and Busan");
    assert_eq!(budget.category_group_note.as_deref(), Some("rough split"));
    assert_eq!(budget.contingency_pct, dec!(15));
    assert!(!editor.is_dirty());
}

#[test]
fn test_blank_note_clears() {
    let mut budget = sample_budget();
    budget
        .category_notes
        .insert(CostCategory::Flight, "Economy".to_string());
    let mut editor = AllocationEditor::new(&budget, &sample_days(), EditorConfig::default());

    editor.set_note(&flight(), "   ").unwrap();
    assert!(editor.to_budget().category_notes.is_empty());
}

#[test]
fn test_save_into_sink() {
    let mut editor = editor();
    editor.set_value(&flight(), "900").unwrap();

    let mut received = Vec::new();
    let mut sink = |budget: &BudgetDefinition| received.push(budget.clone());
    let saved = editor.save_into(&mut sink);

    assert_eq!(received, vec![saved]);
    assert_eq!(
        received[0].budgets_by_category[&CostCategory::Flight],
        dec!(900)
    );
}

#[test]
fn test_unchanged_session_saves_same_budget() {
    let mut editor = editor();
    editor
        .set_mode(AllocationGroup::Country, InputUnit::PerDay)
        .unwrap();
    editor
        .set_mode(AllocationGroup::Category, InputUnit::Percent)
        .unwrap();
    assert_eq!(editor.save(), sample_budget());
}

#[test]
fn test_for_trip_uses_destination_nights() {
    let directory: DestinationDirectory = [Destination {
        id: DestinationId::new(),
        name: "Kyoto".to_string(),
        country: Country::new("Japan"),
        arrival_date: "2026-04-01".parse().ok(),
        departure_date: "2026-04-11".parse().ok(),
    }]
    .into_iter()
    .collect();
    let mut editor =
        AllocationEditor::for_trip(&sample_budget(), &directory, EditorConfig::default());

    editor
        .set_mode(AllocationGroup::Country, InputUnit::PerDay)
        .unwrap();
    assert_eq!(editor.display(&japan()).unwrap().value, dec!(140));
}

fn half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Strategy to generate a unit valid for the country group.
fn unit() -> impl Strategy<Value = InputUnit> {
    prop_oneof![
        Just(InputUnit::Dollars),
        Just(InputUnit::Percent),
        Just(InputUnit::PerDay),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any sequence of unit switches leaves the stored amount unchanged.
    #[test]
    fn prop_mode_round_trip_is_lossless(
        cents in 0i64..10_000_000,
        total in 1i64..100_000,
        days in 0u32..60,
        modes in prop::collection::vec(unit(), 1..20),
    ) {
        let amount = Decimal::new(cents, 2);
        let mut budget = BudgetDefinition::new(Decimal::from(total));
        budget
            .budgets_by_country
            .insert(Country::new("Japan"), amount);
        let days = BTreeMap::from([(Country::new("Japan"), days)]);
        let mut editor = AllocationEditor::new(&budget, &days, EditorConfig::default());

        for mode in modes {
            editor.set_mode(AllocationGroup::Country, mode).unwrap();
        }
        prop_assert_eq!(editor.amount(&japan()).unwrap(), amount);

        editor.set_mode(AllocationGroup::Country, InputUnit::Dollars).unwrap();
        prop_assert_eq!(editor.display(&japan()).unwrap().value, half_up(amount));
    }

    /// Percent input shows as round(x / 100 * total) in dollars.
    #[test]
    fn prop_percent_to_dollars(
        tenths in 0i64..2_000,
        total in 0i64..1_000_000,
    ) {
        let x = Decimal::new(tenths, 1);
        let total = Decimal::from(total);
        let mut editor = AllocationEditor::new(
            &BudgetDefinition::new(total),
            &BTreeMap::new(),
            EditorConfig::default(),
        );

        editor.set_mode(AllocationGroup::Category, InputUnit::Percent).unwrap();
        editor.set_value(&flight(), &x.to_string()).unwrap();
        editor.set_mode(AllocationGroup::Category, InputUnit::Dollars).unwrap();

        let expected = half_up(x / Decimal::ONE_HUNDRED * total);
        prop_assert_eq!(editor.display(&flight()).unwrap().value, expected);
    }

    /// Per-day input shows as round(x * days) in dollars.
    #[test]
    fn prop_per_day_to_dollars(
        cents in 0i64..100_000,
        days in 0u32..90,
    ) {
        let x = Decimal::new(cents, 2);
        let days_by_country = BTreeMap::from([(Country::new("Japan"), days)]);
        let mut editor = AllocationEditor::new(
            &BudgetDefinition::new(dec!(5000)),
            &days_by_country,
            EditorConfig::default(),
        );

        editor.set_mode(AllocationGroup::Country, InputUnit::PerDay).unwrap();
        editor.set_value(&japan(), &x.to_string()).unwrap();
        editor.set_mode(AllocationGroup::Country, InputUnit::Dollars).unwrap();

        prop_assert_eq!(
            editor.display(&japan()).unwrap().value,
            half_up(x * Decimal::from(days))
        );
    }

    /// The unallocated remainder is always total minus allocated, sign included.
    #[test]
    fn prop_summary_balances(
        amounts in prop::collection::vec(0i64..500_000, 0..9),
        total in 0i64..1_000_000,
    ) {
        let total = Decimal::from(total);
        let mut editor = AllocationEditor::new(
            &BudgetDefinition::new(total),
            &BTreeMap::new(),
            EditorConfig::default(),
        );
        for (category, cents) in CostCategory::ALL.into_iter().zip(&amounts) {
            editor
                .set_number(&AllocationKey::Category(category), Decimal::new(*cents, 2))
                .unwrap();
        }

        let summary = editor.summary(AllocationGroup::Category);
        let allocated: Decimal = amounts.iter().map(|c| Decimal::new(*c, 2)).sum();
        prop_assert_eq!(summary.total_allocated, allocated);
        prop_assert_eq!(summary.unallocated, total - allocated);
    }
}

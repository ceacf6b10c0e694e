use std::time::{Duration, Instant};
use tempfile::TempDir;
use vault_core::persist::storage::keys;
use vault_core::{
    DoubleTapTimer, GroupField, MaterialFilter, MaterialId, Season, SlotRepository, TapAction,
    TapEffect, ThemeMode, ThemeOverride, Vault, VaultConfig, VaultError, WritePolicy,
};

fn file_config(dir: &TempDir) -> VaultConfig {
    VaultConfig {
        db_path: Some(dir.path().join("vault").join("vault.sqlite3")),
        write_policy: WritePolicy::Strict,
        ..VaultConfig::default()
    }
}

#[test]
fn fresh_vault_starts_from_defaults_without_writing() {
    let vault = Vault::open_in_memory().unwrap();

    assert!(vault.materials().is_empty());
    assert_eq!(vault.taxonomy().categories.len(), 5);
    assert_eq!(vault.taxonomy().domains.len(), 6);
    assert_eq!(vault.theme().mode, ThemeMode::Stardew);
    assert_eq!(vault.season(), Season::Spring);
    assert!(vault.storage().repo().list_keys().unwrap().is_empty());
}

#[test]
fn state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let config = file_config(&dir);

    let created_id = {
        let mut vault = Vault::open(&config).unwrap();
        assert!(vault.add_category("政策").unwrap());
        assert!(vault.remove_domain("税务").unwrap());
        let draft = vault.new_draft().with_text("标题", "正文内容");
        let id = vault.create_material(draft).unwrap();
        assert_eq!(vault.toggle_key_point(&id).unwrap(), Some(true));
        assert!(vault.select_preset(ThemeMode::Pixel).unwrap());
        id
    };

    let vault = Vault::open(&config).unwrap();
    assert!(vault.taxonomy().categories.contains("政策"));
    assert!(!vault.taxonomy().domains.contains("税务"));
    assert_eq!(vault.materials().len(), 1);
    let material = vault.materials().get(&created_id).unwrap();
    assert!(material.is_key_point);
    assert_eq!(material.category, "案例");
    assert_eq!(vault.theme().mode, ThemeMode::Pixel);
    assert_eq!(vault.season(), Season::Spring);
}

#[test]
fn changing_mutation_writes_all_four_slots() {
    let mut vault = Vault::open_in_memory().unwrap();
    assert!(vault.add_domain("教育").unwrap());

    let mut stored = vault.storage().repo().list_keys().unwrap();
    stored.sort();
    let mut expected: Vec<String> = keys::ALL.iter().map(|k| k.to_string()).collect();
    expected.sort();
    assert_eq!(stored, expected);
}

#[test]
fn no_op_mutations_write_nothing() {
    let mut vault = Vault::open_in_memory().unwrap();
    let unknown = MaterialId::from("missing");

    assert!(!vault.add_category("案例").unwrap());
    assert!(!vault.add_domain("").unwrap());
    assert!(!vault.remove_category("不存在").unwrap());
    assert!(!vault.delete_material(&unknown).unwrap());
    assert_eq!(vault.toggle_key_point(&unknown).unwrap(), None);
    assert!(!vault.select_preset(ThemeMode::Stardew).unwrap());

    assert!(vault.storage().repo().list_keys().unwrap().is_empty());
}

#[test]
fn rejected_create_leaves_state_untouched() {
    let mut vault = Vault::open_in_memory().unwrap();
    let empty = vault.new_draft().with_text("t", "");
    let err = vault.create_material(empty).unwrap_err();

    assert!(matches!(err, VaultError::Material(_)));
    assert!(vault.materials().is_empty());
    assert!(vault.storage().repo().list_keys().unwrap().is_empty());
}

#[test]
fn removed_category_keeps_material_but_drops_it_from_outline() {
    let mut vault = Vault::open_in_memory().unwrap();
    let mut draft = vault.new_draft().with_text("", "一段话");
    draft.category = "金句".to_string();
    let id = vault.create_material(draft).unwrap();

    assert!(vault.remove_category("金句").unwrap());

    assert_eq!(vault.materials().get(&id).unwrap().category, "金句");
    let outline = vault.outline(GroupField::Category);
    assert!(outline.is_empty());
    assert_eq!(vault.materials().count_by(GroupField::Category)["金句"], 1);

    let all = vault.filter(&MaterialFilter::new("", "all", false));
    assert_eq!(all.len(), 1);
    let by_name = vault.filter(&MaterialFilter::new("", "金句", false));
    assert_eq!(by_name.len(), 1);
}

#[test]
fn delete_removes_material_and_persists() {
    let dir = TempDir::new().unwrap();
    let config = file_config(&dir);
    {
        let mut vault = Vault::open(&config).unwrap();
        let draft = vault.new_draft().with_text("a", "first");
        let first = vault.create_material(draft).unwrap();
        let draft = vault.new_draft().with_text("b", "second");
        vault.create_material(draft).unwrap();
        assert!(vault.delete_material(&first).unwrap());
    }

    let vault = Vault::open(&config).unwrap();
    let cards = vault.cards(&MaterialFilter::default());
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].title, "b");
}

#[test]
fn customize_switches_to_custom_mode() {
    let mut vault = Vault::open_in_memory().unwrap();
    let edit = ThemeOverride {
        accent_color: Some("#123456".to_string()),
        ..ThemeOverride::default()
    };

    assert!(vault.customize_theme(&edit).unwrap());
    assert_eq!(vault.theme().mode, ThemeMode::Custom);
    assert_eq!(vault.theme().accent_color, "#123456");

    vault.set_season(Season::Winter);
    assert_eq!(vault.effective_theme(), *vault.theme());
}

#[test]
fn double_tap_cycles_season_and_overlays_stardew_theme() {
    let mut vault = Vault::open_in_memory().unwrap();
    let mut timer = DoubleTapTimer::default();
    let start = Instant::now();

    assert_eq!(timer.activate(start), None);
    let action = timer.activate(start + Duration::from_millis(100)).unwrap();
    assert_eq!(action, TapAction::Secondary);
    assert_eq!(
        vault.apply_tap(action),
        TapEffect::SeasonChanged(Season::Summer)
    );
    assert_eq!(vault.effective_theme().accent_color, "#EAB308");
    assert_eq!(vault.theme().mode, ThemeMode::Stardew);
}

#[test]
fn single_tap_opens_editor_with_preselection() {
    let mut vault = Vault::open_in_memory().unwrap();
    let mut timer = DoubleTapTimer::default();
    let start = Instant::now();

    assert_eq!(timer.activate(start), None);
    assert_eq!(timer.poll(start + Duration::from_millis(100)), None);
    let action = timer.poll(start + Duration::from_millis(300)).unwrap();

    match vault.apply_tap(action) {
        TapEffect::OpenEditor(draft) => {
            assert_eq!(draft.category, "案例");
            assert_eq!(draft.domain, "生态");
            assert!(draft.content.is_empty());
        }
        other => panic!("unexpected effect: {other:?}"),
    }
    assert_eq!(vault.season(), Season::Spring);
}

#[test]
fn season_cycles_through_all_four() {
    let mut vault = Vault::open_in_memory().unwrap();
    let seen: Vec<Season> = (0..4).map(|_| vault.cycle_season()).collect();
    assert_eq!(
        seen,
        vec![Season::Summer, Season::Autumn, Season::Winter, Season::Spring]
    );
}

use domain::permissions;

#[test]
fn namespaces_are_disjoint() {
    for code in permissions::GLOBAL_PERMISSION_CODES {
        assert!(
            !permissions::SECTOR_PERMISSION_CODES.contains(code),
            "{code} appears in both namespaces"
        );
    }
}

#[test]
fn implied_permissions_stay_in_sector_namespace() {
    for code in permissions::GLOBAL_PERMISSION_CODES {
        for implied in permissions::implied_sector_permissions(code) {
            assert!(permissions::is_sector_permission(implied));
        }
    }
    assert!(permissions::implied_sector_permissions(permissions::MANAGE_USERS).is_empty());
}

#[test]
fn view_all_mines_implies_sector_visibility() {
    let implied = permissions::implied_sector_permissions(permissions::VIEW_ALL_MINES);
    assert!(implied.contains(&permissions::VIEW_SECTOR));
    assert!(implied.contains(&permissions::VIEW_SECTOR_SENSORS));
}

#[test]
fn catalog_codes_are_described() {
    for code in permissions::GLOBAL_PERMISSION_CODES {
        assert_ne!(permissions::describe(code), "unknown permission");
    }
    for code in permissions::SECTOR_PERMISSION_CODES {
        assert_ne!(permissions::describe(code), "unknown permission");
    }
}

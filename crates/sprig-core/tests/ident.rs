use sprig_core::ident::{is_reserved_word, is_valid_identifier, validate_identifier, Direction};

#[test]
fn accepts_the_allow_list() {
    for name in ["a", "_", "users", "first_name", "Table2", "_internal"] {
        assert!(is_valid_identifier(name), "{name}");
    }

    assert!(is_valid_identifier(&"x".repeat(64)));
}

#[test]
fn rejects_injection_shapes() {
    let hostile = [
        "",
        "users;",
        "users; DROP TABLE users",
        "name--",
        "first name",
        "tab\tname",
        "\"quoted\"",
        "it's",
        "`tick`",
        "1column",
        "a.b",
        "naïve",
    ];

    for name in hostile {
        assert!(!is_valid_identifier(name), "{name:?}");
        let err = validate_identifier(name).unwrap_err();
        assert!(err.is_invalid_identifier());
        assert_eq!(err.code(), "INVALID_IDENTIFIER");
    }

    assert!(!is_valid_identifier(&"x".repeat(65)));
}

#[test]
fn reserved_words_are_still_valid() {
    assert!(is_reserved_word("order"));
    assert!(is_reserved_word("User"));
    assert!(is_valid_identifier("order"));
    assert!(!is_reserved_word("email"));
}

#[test]
fn directions() {
    assert_eq!(Direction::parse("asc").unwrap(), Direction::Asc);
    assert_eq!(Direction::parse("DeSc").unwrap(), Direction::Desc);
    assert!(Direction::parse("DESC; DROP").unwrap_err().is_invalid_identifier());
    assert_eq!(Direction::Desc.reverse(), Direction::Asc);
}

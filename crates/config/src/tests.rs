use super::*;

#[test]
fn default_options_create_file_with_no_default() {
    let opts: OpenOptions<String> = OpenOptions::new();
    assert!(opts.create_if_missing);
    assert!(matches!(opts.default, DefaultValue::None));
}

#[test]
fn constant_default_resolves_to_same_value_every_time() {
    let policy: DefaultValue<String> = DefaultValue::Constant("fallback".to_string());
    assert_eq!(policy.resolve("a"), Some("fallback".to_string()));
    assert_eq!(policy.resolve("b"), Some("fallback".to_string()));
}

#[test]
fn factory_default_resolves_from_key() {
    let policy: DefaultValue<String> = DefaultValue::Factory(Arc::new(|k: &str| format!("default-for-{k}")));
    assert_eq!(policy.resolve("alpha"), Some("default-for-alpha".to_string()));
}

#[test]
fn none_policy_never_resolves() {
    let policy: DefaultValue<String> = DefaultValue::None;
    assert_eq!(policy.resolve("anything"), None);
}

#[test]
fn builder_methods_are_chainable() {
    let opts: OpenOptions<String> = OpenOptions::new()
        .create_if_missing(false)
        .default_constant("x".to_string());
    assert!(!opts.create_if_missing);
    assert_eq!(opts.default.resolve("k"), Some("x".to_string()));
}

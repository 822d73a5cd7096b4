//! End-to-end fixture matching the worked scenarios: a `DummyFile`-style
//! object graph (`name`/`size`/`float`/`attributes`/`hash`/
//! `imported_dlls`/`deferred_values`/a non-data `Callable`), run through
//! the full `query text -> parse -> compile -> matches` pipeline.
//!
//! Ported in semantics (not in source language) from the upstream
//! Python test fixture this engine's design is grounded on.

use std::cell::RefCell;
use std::rc::Rc;

use objectfilter::{build, FilterImplementation, HostValue, Member, Value};

#[derive(Debug)]
struct HashObject {
    md5: String,
}

impl HostValue for HashObject {
    fn field(&self, name: &str) -> Member {
        match name {
            "md5" => Member::Scalar(Value::String(self.md5.clone())),
            _ => Member::Missing,
        }
    }
}

#[derive(Debug)]
struct Dll {
    name: String,
    imported_functions: Vec<String>,
}

impl HostValue for Dll {
    fn field(&self, name: &str) -> Member {
        match name {
            "name" => Member::Scalar(Value::String(self.name.clone())),
            "imported_functions" => Member::Sequence(Box::new(
                self.imported_functions
                    .clone()
                    .into_iter()
                    .map(Value::String),
            )),
            "num_imported_functions" => {
                Member::Scalar(Value::Integer(self.imported_functions.len() as i64))
            }
            _ => Member::Missing,
        }
    }
}

#[derive(Debug)]
struct DummyFile {
    imported_dlls: Vec<Rc<Dll>>,
    deferred_calls: RefCell<u32>,
}

impl DummyFile {
    fn new() -> Self {
        DummyFile {
            imported_dlls: vec![
                Rc::new(Dll {
                    name: "a.dll".into(),
                    imported_functions: vec!["FindWindow".into(), "CreateFileA".into()],
                }),
                Rc::new(Dll {
                    name: "b.dll".into(),
                    imported_functions: vec!["RegQueryValueEx".into()],
                }),
            ],
            deferred_calls: RefCell::new(0),
        }
    }

    fn deferred_calls(&self) -> u32 {
        *self.deferred_calls.borrow()
    }
}

impl HostValue for DummyFile {
    fn field(&self, name: &str) -> Member {
        match name {
            "name" => Member::Scalar(Value::String("yay.exe".into())),
            "size" => Member::Scalar(Value::Integer(10)),
            "float" => Member::Scalar(Value::Float(123.9823)),
            "attributes" => Member::Scalar(Value::List(vec![
                Value::String("Backup".into()),
                Value::String("Archive".into()),
            ])),
            "hash" => Member::Sequence(Box::new(
                [
                    Rc::new(HashObject {
                        md5: "123abc".into(),
                    }),
                    Rc::new(HashObject {
                        md5: "456def".into(),
                    }),
                ]
                .into_iter()
                .map(|h| Value::Object(h as Rc<dyn HostValue>)),
            )),
            "imported_dlls" => Member::Sequence(Box::new(
                self.imported_dlls
                    .clone()
                    .into_iter()
                    .map(|d| Value::Object(d as Rc<dyn HostValue>)),
            )),
            "deferred_values" => {
                *self.deferred_calls.borrow_mut() += 1;
                Member::Sequence(Box::new(
                    ["a", "b"].into_iter().map(|s| Value::String(s.into())),
                ))
            }
            "callable" => Member::Callable,
            _ => Member::Missing,
        }
    }
}

fn root(file: Rc<DummyFile>) -> Value {
    Value::Object(file as Rc<dyn HostValue>)
}

#[test]
fn scenario_size_less_than_11() {
    let file = Rc::new(DummyFile::new());
    let impl_ = FilterImplementation::lowercase();
    assert!(build("size < 11", &impl_).unwrap().matches(&root(file)));
}

#[test]
fn scenario_size_less_than_10_is_false() {
    let file = Rc::new(DummyFile::new());
    let impl_ = FilterImplementation::lowercase();
    assert!(!build("size < 10", &impl_).unwrap().matches(&root(file)));
}

#[test]
fn scenario_float_greater_equal() {
    let file = Rc::new(DummyFile::new());
    let impl_ = FilterImplementation::lowercase();
    assert!(build("float >= 123.9823", &impl_)
        .unwrap()
        .matches(&root(file)));
}

#[test]
fn scenario_name_contains_substring() {
    let file = Rc::new(DummyFile::new());
    let impl_ = FilterImplementation::lowercase();
    assert!(build("name contains 'yay'", &impl_)
        .unwrap()
        .matches(&root(file)));
}

#[test]
fn scenario_nested_path_contains() {
    let file = Rc::new(DummyFile::new());
    let impl_ = FilterImplementation::lowercase();
    assert!(
        build("imported_dlls.imported_functions contains 'FindWindow'", &impl_)
            .unwrap()
            .matches(&root(file))
    );
}

#[test]
fn scenario_inset_subset_true() {
    let file = Rc::new(DummyFile::new());
    let impl_ = FilterImplementation::lowercase();
    assert!(
        build(r#"attributes inset ["Archive","Backup","X"]"#, &impl_)
            .unwrap()
            .matches(&root(file))
    );
}

#[test]
fn scenario_inset_subset_false() {
    let file = Rc::new(DummyFile::new());
    let impl_ = FilterImplementation::lowercase();
    assert!(
        !build(r#"attributes inset ["Executable","Sparse"]"#, &impl_)
            .unwrap()
            .matches(&root(file))
    );
}

#[test]
fn scenario_repeated_leaf_equals() {
    let file = Rc::new(DummyFile::new());
    let impl_ = FilterImplementation::lowercase();
    assert!(build("hash.md5 == '456def'", &impl_)
        .unwrap()
        .matches(&root(file)));
}

#[test]
fn scenario_callable_member_contributes_nothing() {
    let file = Rc::new(DummyFile::new());
    let impl_ = FilterImplementation::lowercase();
    assert!(!build("callable == 'x'", &impl_)
        .unwrap()
        .matches(&root(file)));
}

#[test]
fn scenario_context_same_dll_matches() {
    let file = Rc::new(DummyFile::new());
    let impl_ = FilterImplementation::lowercase();
    let query = "@imported_dlls(imported_functions contains 'RegQueryValueEx' AND num_imported_functions == 1)";
    assert!(build(query, &impl_).unwrap().matches(&root(file)));
}

#[test]
fn scenario_context_wrong_arity_does_not_match() {
    let file = Rc::new(DummyFile::new());
    let impl_ = FilterImplementation::lowercase();
    let query = "@imported_dlls(imported_functions contains 'RegQueryValueEx' AND num_imported_functions == 2)";
    assert!(!build(query, &impl_).unwrap().matches(&root(file)));
}

#[test]
fn scenario_without_context_matches_across_distinct_dlls() {
    let file = Rc::new(DummyFile::new());
    let impl_ = FilterImplementation::lowercase();
    let query = "imported_dlls.num_imported_functions == 2 AND imported_dlls.imported_functions contains 'RegQueryValueEx'";
    assert!(build(query, &impl_).unwrap().matches(&root(file)));
}

#[test]
fn deferred_values_is_read_lazily_at_most_once_per_matches_call() {
    let file = Rc::new(DummyFile::new());
    let impl_ = FilterImplementation::lowercase();
    let filter = build("deferred_values contains 'a'", &impl_).unwrap();
    assert!(filter.matches(&root(file.clone())));
    // `Contains` short-circuits on the first element, but the sequence
    // itself is only ever read once (no call even produces it twice).
    assert_eq!(file.deferred_calls(), 1);
}

#[test]
fn case_insensitive_attribute_lookup() {
    let file = Rc::new(DummyFile::new());
    let impl_ = FilterImplementation::lowercase();
    let lower = build("size == 10", &impl_).unwrap().matches(&root(file.clone()));
    let upper = build("Size == 10", &impl_).unwrap().matches(&root(file));
    assert_eq!(lower, upper);
}

#[test]
fn double_negation_is_identity() {
    let file = Rc::new(DummyFile::new());
    let impl_ = FilterImplementation::lowercase();
    let plain = build("size == 10", &impl_).unwrap();
    let double_negated = build("size != 10", &impl_).unwrap();
    assert_eq!(plain.matches(&root(file.clone())), !double_negated.matches(&root(file)));
}

//! On-demand population of packages

use resolver::names::{parse_simple_name, NamePart};
use resolver::symbols::{loader, Declaration, LoadOutcome, LoadState};
use resolver::{ContainerId, Resolver, ResolverConfig};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Default)]
struct Calls {
    targeted: RefCell<Vec<String>>,
    full: Cell<usize>,
}

fn lazy_package(resolver: &mut Resolver, decl: Declaration) -> ContainerId {
    let root = resolver.root();
    let pkg = resolver.define(root, decl).unwrap();
    resolver.scope_of(pkg).unwrap()
}

#[test]
fn test_targeted_load_leaves_package_unloaded() {
    resolver::logging::init_test();
    let mut resolver = Resolver::new();
    let calls = Rc::new(Calls::default());
    let seen = calls.clone();

    let pkg = lazy_package(
        &mut resolver,
        Declaration::lazy_package(
            "pkg",
            loader(move |_, _, request| match request {
                Some(part) => {
                    seen.targeted.borrow_mut().push(part.text().to_string());
                    if part.text() == "Foo" {
                        LoadOutcome::Partial(vec![Declaration::type_decl("Foo")])
                    } else {
                        LoadOutcome::Done
                    }
                }
                None => {
                    seen.full.set(seen.full.get() + 1);
                    LoadOutcome::Done
                }
            }),
        ),
    );

    let foo = resolver.find(pkg, &NamePart::simple("Foo")).unwrap();
    assert!(foo.is_some());
    assert_eq!(*calls.targeted.borrow(), vec!["Foo".to_string()]);
    assert_eq!(calls.full.get(), 0);
    assert_eq!(resolver.load_state(pkg), LoadState::Unloaded);

    // Found in the table now; the loader is not consulted again
    assert_eq!(resolver.find(pkg, &NamePart::simple("Foo")).unwrap(), foo);
    assert_eq!(calls.targeted.borrow().len(), 1);
}

#[test]
fn test_failed_targeted_load_falls_back_to_full_load() {
    let mut resolver = Resolver::new();
    let calls = Rc::new(Calls::default());
    let seen = calls.clone();

    let pkg = lazy_package(
        &mut resolver,
        Declaration::lazy_package(
            "pkg",
            loader(move |resolver, container, request| {
                if let Some(part) = request {
                    seen.targeted.borrow_mut().push(part.text().to_string());
                    return LoadOutcome::Done;
                }
                seen.full.set(seen.full.get() + 1);
                resolver.define(container, Declaration::type_decl("Foo")).unwrap();
                resolver.define(container, Declaration::type_decl("Bar")).unwrap();
                LoadOutcome::Done
            }),
        ),
    );

    assert!(resolver.find(pkg, &NamePart::simple("Bar")).unwrap().is_some());
    assert_eq!(calls.full.get(), 1);
    assert_eq!(resolver.load_state(pkg), LoadState::Loaded);

    // Loaded containers answer misses without consulting the loader
    assert!(resolver.find(pkg, &NamePart::simple("Missing")).unwrap().is_none());
    assert_eq!(*calls.targeted.borrow(), vec!["Bar".to_string()]);
    assert_eq!(calls.full.get(), 1);
}

#[test]
fn test_full_load_is_idempotent() {
    let mut resolver = Resolver::new();
    let calls = Rc::new(Calls::default());
    let seen = calls.clone();

    let pkg = lazy_package(
        &mut resolver,
        Declaration::lazy_package(
            "pkg",
            loader(move |resolver, container, _| {
                seen.full.set(seen.full.get() + 1);
                resolver.define(container, Declaration::thread("Main")).unwrap();
                LoadOutcome::Done
            }),
        ),
    );

    resolver.force_load(pkg).unwrap();
    resolver.force_load(pkg).unwrap();
    assert_eq!(calls.full.get(), 1);
    assert_eq!(resolver.content(pkg).len(), 1);
}

#[test]
fn test_reentrant_access_during_load() {
    let mut resolver = Resolver::new();
    let states = Rc::new(RefCell::new(Vec::new()));
    let seen = states.clone();

    let pkg = lazy_package(
        &mut resolver,
        Declaration::lazy_package(
            "pkg",
            loader(move |resolver, container, request| {
                if request.is_some() {
                    return LoadOutcome::Done;
                }
                seen.borrow_mut().push(resolver.load_state(container));
                resolver.force_load(container).unwrap();
                let inner = resolver.find(container, &NamePart::simple("Later")).unwrap();
                assert!(inner.is_none());
                resolver.define(container, Declaration::type_decl("Later")).unwrap();
                LoadOutcome::Done
            }),
        ),
    );

    let found = resolver.find(pkg, &NamePart::simple("Later")).unwrap();
    assert!(found.is_some());
    assert_eq!(*states.borrow(), vec![LoadState::Loading]);
    assert_eq!(resolver.load_state(pkg), LoadState::Loaded);
}

#[test]
fn test_not_yet_ready_retries() {
    let mut resolver = Resolver::new();
    let attempts = Rc::new(Cell::new(0));
    let seen = attempts.clone();

    let pkg = lazy_package(
        &mut resolver,
        Declaration::lazy_package(
            "pkg",
            loader(move |resolver, container, request| {
                if request.is_some() {
                    return LoadOutcome::Done;
                }
                seen.set(seen.get() + 1);
                if seen.get() == 1 {
                    return LoadOutcome::NotYetReady;
                }
                resolver.define(container, Declaration::type_decl("Ready")).unwrap();
                LoadOutcome::Done
            }),
        ),
    );

    assert!(resolver.find(pkg, &NamePart::simple("Ready")).unwrap().is_none());
    assert_eq!(resolver.load_state(pkg), LoadState::Unloaded);

    assert!(resolver.find(pkg, &NamePart::simple("Ready")).unwrap().is_some());
    assert_eq!(attempts.get(), 2);
    assert_eq!(resolver.load_state(pkg), LoadState::Loaded);
}

#[test]
fn test_partial_full_load() {
    let mut resolver = Resolver::new();
    let batches = Rc::new(RefCell::new(vec![
        vec![Declaration::type_decl("First")],
        vec![Declaration::type_decl("Second")],
    ]));
    let source = batches.clone();

    let pkg = lazy_package(
        &mut resolver,
        Declaration::lazy_package(
            "pkg",
            loader(move |_, _, request| {
                if request.is_some() {
                    return LoadOutcome::Done;
                }
                let mut batches = source.borrow_mut();
                if batches.is_empty() {
                    LoadOutcome::Done
                } else {
                    LoadOutcome::Partial(batches.remove(0))
                }
            }),
        ),
    );

    resolver.force_load(pkg).unwrap();
    assert_eq!(resolver.load_state(pkg), LoadState::Unloaded);
    assert_eq!(resolver.content(pkg).len(), 1);

    // Second batch arrives on the next miss
    assert!(resolver.find(pkg, &NamePart::simple("Second")).unwrap().is_some());
    resolver.force_load(pkg).unwrap();
    assert_eq!(resolver.load_state(pkg), LoadState::Loaded);
    assert!(batches.borrow().is_empty());
}

#[test]
fn test_targeted_loads_can_be_disabled() {
    let mut resolver = Resolver::with_config(ResolverConfig::default().with_targeted_loads(false));
    let calls = Rc::new(Calls::default());
    let seen = calls.clone();

    let pkg = lazy_package(
        &mut resolver,
        Declaration::lazy_package(
            "pkg",
            loader(move |resolver, container, request| {
                if let Some(part) = request {
                    seen.targeted.borrow_mut().push(part.text().to_string());
                }
                seen.full.set(seen.full.get() + 1);
                resolver.define(container, Declaration::type_decl("Foo")).unwrap();
                LoadOutcome::Done
            }),
        ),
    );

    assert!(resolver.find(pkg, &NamePart::simple("Foo")).unwrap().is_some());
    assert!(calls.targeted.borrow().is_empty());
    assert_eq!(calls.full.get(), 1);
}

#[test]
fn test_nested_lazy_packages_resolve_by_path() {
    let mut resolver = Resolver::new();
    let root = resolver.root();
    resolver
        .define(
            root,
            Declaration::lazy_package(
                "std",
                loader(|resolver, container, request| {
                    if request.is_some() {
                        return LoadOutcome::Done;
                    }
                    let io = Declaration::lazy_package(
                        "io",
                        loader(|_, _, request| match request {
                            Some(_) => LoadOutcome::Done,
                            None => LoadOutcome::Partial(vec![Declaration::type_decl("File")]),
                        }),
                    );
                    resolver.define(container, io).unwrap();
                    LoadOutcome::Done
                }),
            ),
        )
        .unwrap();

    let file = resolver.find_name(root, &parse_simple_name("std.io.File")).unwrap();
    let file = file.expect("std.io.File should load");
    assert_eq!(resolver.display_path(file), "std.io.File");
}

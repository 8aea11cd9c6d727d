//! Mangled name round trips through a populated session

use resolver::names::{codec, parse_complex_name, parse_simple_name, NameCodec, NamePart, QualifiedName, TypeSignature};
use resolver::symbols::Declaration;
use resolver::{EntityId, ResolveError, Resolver};

fn session() -> (Resolver, Vec<TypeSignature>) {
    let mut resolver = Resolver::new();
    let root = resolver.root();
    let core = resolver.define(root, Declaration::package("core")).unwrap();
    let scope = resolver.scope_of(core).unwrap();
    let int = resolver.define(scope, Declaration::type_decl("Int")).unwrap();
    let string = resolver.define(scope, Declaration::type_decl("String")).unwrap();
    let map = resolver
        .define(
            scope,
            Declaration::type_decl("Map")
                .with_params([TypeSignature::value(int), TypeSignature::reference(string)]),
        )
        .unwrap();

    let signatures = vec![
        TypeSignature::value(int),
        TypeSignature::reference(string),
        TypeSignature::void(),
        TypeSignature::reference(map),
    ];
    (resolver, signatures)
}

fn round_trip(resolver: &mut Resolver, entity: EntityId) {
    let encoded = NameCodec::encode_entity(resolver, entity);
    let root = resolver.root();
    let decoded = resolver.decode_name(root, &encoded).unwrap();
    assert_eq!(decoded, entity, "{:?}", encoded);

    let name = NameCodec::parse(resolver, &encoded).unwrap();
    assert_eq!(name, resolver.path_of(entity));
    assert_eq!(resolver.encode_name(&name), encoded);
}

#[test]
fn test_round_trip_with_up_to_three_params() {
    let (mut resolver, signatures) = session();
    let root = resolver.root();
    let host = resolver.define(root, Declaration::type_decl("Host")).unwrap();
    let members = resolver.scope_of(host).unwrap();

    let mut defined = Vec::new();
    for a in 0..signatures.len() {
        for b in 0..signatures.len() {
            for arity in 0..=3 {
                let params: Vec<TypeSignature> = [signatures[a], signatures[b], signatures[(a + b) % signatures.len()]]
                    .into_iter()
                    .take(arity)
                    .collect();
                let decl = Declaration::function("call", TypeSignature::void()).with_params(params);
                if let Ok(entity) = resolver.define(members, decl) {
                    defined.push(entity);
                }
            }
        }
    }

    assert!(defined.len() > 20);
    for entity in defined {
        round_trip(&mut resolver, entity);
    }
}

#[test]
fn test_parameterized_type_path() {
    let (mut resolver, signatures) = session();
    let TypeSignature { entity: Some(map), .. } = signatures[3] else {
        unreachable!()
    };

    assert_eq!(
        NameCodec::encode_entity(&resolver, map),
        "core\u{1}Map\u{2}\u{4}core\u{1}Int\u{5}core\u{1}String\u{3}"
    );
    assert_eq!(resolver.display_path(map), "core.Map(core.Int, &core.String)");
    round_trip(&mut resolver, map);
}

#[test]
fn test_void_is_not_a_lookup_failure() {
    let (mut resolver, _) = session();
    let root = resolver.root();
    let encoded = format!("f{}{}{}", codec::OPEN, codec::COMMA, codec::CLOSE);
    let name = NameCodec::parse(&mut resolver, &encoded).unwrap();
    assert_eq!(name.last().unwrap().params(), &[TypeSignature::void()]);

    let err = resolver.decode_name(root, &encoded).unwrap_err();
    assert!(matches!(err, ResolveError::LookupFailure { .. }));
}

#[test]
fn test_decode_relative_to_scope() {
    let (mut resolver, signatures) = session();
    let root = resolver.root();
    let core = resolver.find_name(root, &parse_simple_name("core")).unwrap().unwrap();
    let scope = resolver.scope_of(core).unwrap();

    let int = signatures[0].entity.unwrap();
    assert_eq!(resolver.decode_name(scope, "Int").unwrap(), int);
    assert_eq!(resolver.decode_name(scope, "").unwrap(), core);
}

#[test]
fn test_typed_params_decode_from_package_scope() {
    let (mut resolver, signatures) = session();
    let root = resolver.root();
    let core = resolver.find_name(root, &parse_simple_name("core")).unwrap().unwrap();
    let scope = resolver.scope_of(core).unwrap();
    let int = signatures[0].entity.unwrap();
    let f = resolver
        .define(
            scope,
            Declaration::function("f", TypeSignature::void()).with_params([TypeSignature::value(int)]),
        )
        .unwrap();

    let relative = QualifiedName::root().with(NamePart::with_params("f", [TypeSignature::value(int)]));
    let encoded = resolver.encode_name(&relative);
    assert_eq!(encoded, "f\u{2}\u{4}core\u{1}Int\u{3}");
    assert_eq!(resolver.decode_name(scope, &encoded).unwrap(), f);

    // Parameter paths stay absolute even from a scope that cannot see `core`
    let map = signatures[3].entity.unwrap();
    let members = resolver.scope_of(map).unwrap();
    let g = resolver
        .define(
            members,
            Declaration::function("g", TypeSignature::void()).with_params(signatures.clone()),
        )
        .unwrap();
    let encoded = resolver.encode_name(&resolver.path_of(g).suffix_from(2));
    assert_eq!(resolver.decode_name(members, &encoded).unwrap(), g);
}

#[test]
fn test_recursive_part_encodes_like_its_resolved_form() {
    let (mut resolver, signatures) = session();
    let root = resolver.root();
    let core = resolver.find_name(root, &parse_simple_name("core")).unwrap().unwrap();
    let scope = resolver.scope_of(core).unwrap();
    let string = signatures[1].entity.unwrap();
    let h = resolver
        .define(
            scope,
            Declaration::function("h", TypeSignature::void()).with_params([TypeSignature::value(string)]),
        )
        .unwrap();

    let pattern = parse_complex_name("h(core.String)").unwrap();
    let resolved = QualifiedName::root().with(NamePart::with_params("h", [TypeSignature::value(string)]));
    let encoded = resolver.encode_name(&pattern);
    assert_eq!(encoded, resolver.encode_name(&resolved));
    assert_eq!(resolver.decode_name(scope, &encoded).unwrap(), h);
    assert_eq!(resolver.find(scope, pattern.last().unwrap()).unwrap(), Some(h));
}

#[test]
fn test_invalid_encoding_reports_offset() {
    let (mut resolver, _) = session();
    let root = resolver.root();
    let encoded = format!("core{}Int{}", codec::DOT, codec::CLOSE);

    match resolver.decode_name(root, &encoded) {
        Err(ResolveError::InvalidEncoding { position, encoded: echoed, .. }) => {
            assert_eq!(position, 8);
            assert_eq!(echoed, encoded);
        }
        other => panic!("expected an encoding error, got {:?}", other),
    }
}

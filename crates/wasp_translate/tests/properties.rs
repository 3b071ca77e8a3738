//! End-to-end exercise of the testable properties and scenarios against
//! hand-built stores, mirroring `wasp_driver/tests/driver_smoke.rs`'s
//! convention of wiring a few members directly rather than going through
//! a front end.

use wasp_ir::{
    Address, BinaryOp, ConcreteMethod, ConcreteType, FuncArgShape, Id, Literal, MethodId, TypeId, UnaryOp,
};
use wasp_ir::Expr;
use wasp_meta::{
    CompilationKind, CompileOptions, CustomTypeInfo, GraphNode, MacroRequest, MacroResult, Macro, MemberInfo,
    MemberState, MemoryMetadataStore, UnionCaseInfo, UnionCaseKind, WellKnownType,
};
use wasp_translate::context::TranslatorState;

fn member(name: &str, kind: CompilationKind) -> MemberInfo {
    MemberInfo { name: name.to_string(), signature: format!("{name}()"), kind }
}

fn call(ty: TypeId, method: MethodId, args: Vec<Expr>) -> Expr {
    Expr::Call {
        receiver: None,
        concrete_type: ConcreteType::simple(ty),
        concrete_method: ConcreteMethod { entity: method, generics: vec![] },
        args,
        base_call: false,
        dynamic_name: None,
    }
}

/// S1: `Static` method call lowers to a plain call at its address and
/// leaves a graph edge from the caller to the callee.
#[test]
fn static_call_lowers_to_its_address_and_records_a_graph_edge() {
    let mut store = MemoryMetadataStore::new();
    let ty = TypeId(1);
    let m = MethodId(1);
    store.queue_method(
        ty,
        m,
        member("M", CompilationKind::Static(Address::new(["N", "M"]))),
        Expr::Binary {
            left: Box::new(Expr::Var(Id::fresh("x", false))),
            op: BinaryOp::Add,
            right: Box::new(Expr::Literal(Literal::Int(1))),
        },
    );

    let mut state = TranslatorState::new(GraphNode::EntryPointNode, false);
    let result = wasp_translate::translate_expr(&mut store, &mut state, call(ty, m, vec![Expr::Literal(Literal::Int(2))])).unwrap();

    assert_eq!(
        result,
        Expr::Application { func: Box::new(Expr::GlobalAccess(Address::new(["N", "M"]))), args: vec![Expr::Literal(Literal::Int(2))] }
    );
    assert!(store.graph_mut().unwrap().is_reachable(&GraphNode::EntryPointNode, &GraphNode::MethodNode(ty, m)));
}

/// S2: an inline identity call reduces to its argument, with the formal
/// lambda wrapper stripped rather than left dangling at the call site.
#[test]
fn inline_call_reduces_to_the_substituted_argument() {
    let mut store = MemoryMetadataStore::new();
    let ty = TypeId(2);
    let id_method = MethodId(1);
    let x = Id::fresh("x", false);
    store.queue_method(
        ty,
        id_method,
        member("id", CompilationKind::Inline),
        Expr::Lambda { params: vec![x.clone()], body: Box::new(Expr::Var(x)) },
    );

    let mut state = TranslatorState::new(GraphNode::EntryPointNode, false);
    let result =
        wasp_translate::translate_expr(&mut store, &mut state, call(ty, id_method, vec![Expr::Literal(Literal::Int(3))])).unwrap();

    assert_eq!(result, Expr::Literal(Literal::Int(3)));
}

/// S3 / property 1: mutual inline recursion is detected and both members
/// end up in the failed set rather than stuck `Compiling` forever.
#[test]
fn mutual_inline_recursion_is_detected_and_both_members_are_marked_failed() {
    let mut store = MemoryMetadataStore::new();
    let ty = TypeId(3);
    let f = MethodId(1);
    let g = MethodId(2);

    store.queue_method(
        ty,
        f,
        member("F", CompilationKind::Inline),
        Expr::Lambda { params: vec![], body: Box::new(call(ty, g, vec![])) },
    );
    store.queue_method(
        ty,
        g,
        member("G", CompilationKind::Inline),
        Expr::Lambda { params: vec![], body: Box::new(call(ty, f, vec![])) },
    );

    let mut state = TranslatorState::new(GraphNode::EntryPointNode, false);
    let result = wasp_translate::translate_expr(&mut store, &mut state, call(ty, f, vec![]));

    assert!(result.is_err());
    assert!(matches!(store.method_state(ty, f), Some(MemberState::Failed { .. })));
    assert!(matches!(store.method_state(ty, g), Some(MemberState::Failed { .. })));
}

/// Property 3: a body built only from the forms the Translator passes
/// through unchanged (literals, locals, conditionals, object/array
/// literals, `GlobalAccess`) translates to a structurally equal body.
#[test]
fn translating_a_plain_expression_twice_is_idempotent() {
    let mut store = MemoryMetadataStore::without_graph();
    let expr = Expr::Conditional {
        cond: Box::new(Expr::Binary {
            left: Box::new(Expr::Literal(Literal::Int(1))),
            op: BinaryOp::Less,
            right: Box::new(Expr::Literal(Literal::Int(2))),
        }),
        then_branch: Box::new(Expr::Object(vec![(
            "a".to_string(),
            Expr::Array(vec![Expr::Literal(Literal::Int(1)), Expr::GlobalAccess(Address::new(["N"]))]),
        )])),
        else_branch: Box::new(Expr::Undefined),
    };

    let mut state = TranslatorState::new(GraphNode::EntryPointNode, false);
    let once = wasp_translate::translate_expr(&mut store, &mut state, expr).unwrap();
    let mut state2 = TranslatorState::new(GraphNode::EntryPointNode, false);
    let twice = wasp_translate::translate_expr(&mut store, &mut state2, once.clone()).unwrap();

    assert_eq!(once, twice);
}

/// S4 / property 4: a two-case union round-trips its tag and field
/// through `NewUnionCase`/`UnionCaseTag`/`UnionCaseGet`.
#[test]
fn union_case_round_trips_through_tag_and_field_access() {
    let mut store = MemoryMetadataStore::without_graph();
    let union_ty = TypeId(4);
    store.define_class(union_ty, Some(Address::new(["N", "U"])), None, false);
    let case_a = UnionCaseInfo { name: "A".to_string(), tag: 0, kind: UnionCaseKind::FieldBearing, fields: vec!["Item".to_string()] };
    store.define_custom_type(
        union_ty,
        CustomTypeInfo::Union { cases: vec![case_a, UnionCaseInfo { name: "B".to_string(), tag: 1, kind: UnionCaseKind::Singleton, fields: vec![] }], erased: false },
    );

    let mut state = TranslatorState::new(GraphNode::EntryPointNode, false);
    let built = wasp_translate::translate_expr(
        &mut store,
        &mut state,
        Expr::NewUnionCase { concrete_type: ConcreteType::simple(union_ty), case: "A".to_string(), args: vec![Expr::Literal(Literal::Int(7))] },
    )
    .unwrap();

    assert_eq!(
        built,
        Expr::CopyCtor {
            concrete_type: ConcreteType::simple(union_ty),
            obj: Box::new(Expr::Object(vec![
                ("$".to_string(), Expr::Literal(Literal::Int(0))),
                ("$0".to_string(), Expr::Literal(Literal::Int(7))),
            ])),
        }
    );

    let tag = wasp_translate::translate_expr(
        &mut store,
        &mut state,
        Expr::UnionCaseTag { expr: Box::new(built.clone()), concrete_type: ConcreteType::simple(union_ty) },
    )
    .unwrap();
    assert_eq!(
        tag,
        Expr::ItemGetString { obj: Box::new(built.clone()), key: Box::new(Expr::Literal(Literal::String("$".to_string()))) }
    );

    let item = wasp_translate::translate_expr(
        &mut store,
        &mut state,
        Expr::UnionCaseGet { expr: Box::new(built.clone()), concrete_type: ConcreteType::simple(union_ty), case: "A".to_string(), field: "Item".to_string() },
    )
    .unwrap();
    assert_eq!(
        item,
        Expr::ItemGetString { obj: Box::new(built), key: Box::new(Expr::Literal(Literal::String("$0".to_string()))) }
    );
}

/// Property 5: an erased union's tag probe uses `instanceof` when a
/// representative constructor is known, and a `typeof`/name-lowercase
/// comparison otherwise.
#[test]
fn erased_union_case_probe_picks_instanceof_or_typeof() {
    let case = UnionCaseInfo { name: "Leaf".to_string(), tag: 0, kind: UnionCaseKind::FieldBearing, fields: vec![] };
    let x = Id::fresh("x", false);

    let with_ctor = wasp_translate::custom_type::erased_case_probe(Expr::Var(x.clone()), &case, Some(&Address::new(["N", "Leaf"])));
    assert!(matches!(with_ctor, Expr::InstanceOf { .. }));

    let without_ctor = wasp_translate::custom_type::erased_case_probe(Expr::Var(x.clone()), &case, None);
    assert_eq!(
        without_ctor,
        Expr::Binary {
            left: Box::new(Expr::Unary { op: UnaryOp::TypeOf, expr: Box::new(Expr::Var(x)) }),
            op: BinaryOp::Equal,
            right: Box::new(Expr::Literal(Literal::String("leaf".to_string()))),
        }
    );
}

/// Property 6: a manually eta-expanded 2-ary lambda whose body is a
/// saturated application of a free variable collapses to
/// `Runtime.Curried2(f)` exactly once; re-optimizing is a fixed point.
#[test]
fn curried_collector_reaches_a_fixed_point_on_a_second_pass() {
    let a = Id::fresh("a", false);
    let b = Id::fresh("b", false);
    let f = Id::fresh("f", false);
    let chain = Expr::Lambda {
        params: vec![a.clone()],
        body: Box::new(Expr::Lambda {
            params: vec![b.clone()],
            body: Box::new(Expr::Application { func: Box::new(Expr::Var(f.clone())), args: vec![Expr::Var(a), Expr::Var(b)] }),
        }),
    };

    let once = wasp_translate::optimize::optimize_member(chain, false);
    assert_eq!(once, wasp_translate::runtime::curried(Expr::Var(f), 2, vec![]));

    let twice = wasp_translate::optimize::optimize_member(once.clone(), false);
    assert_eq!(once, twice);
}

/// Property 7: `base.M(a)` on a class whose parent's prototype
/// address is `P` lowers to `P.prototype.M.call(this, a)`.
#[test]
fn base_call_lowers_to_prototype_method_call_with_this_prepended() {
    let mut store = MemoryMetadataStore::new();
    let ty = TypeId(7);
    store.define_class(ty, Some(Address::new(["P"])), None, false);
    let m = MethodId(1);
    store.queue_method(ty, m, member("M", CompilationKind::Instance("M".to_string())), Expr::Undefined);
    store.add_compiled_method(ty, m, CompileOptions::default(), Expr::Undefined);

    let mut state = TranslatorState::new(GraphNode::MethodNode(ty, MethodId(9)), false);
    let a = Id::fresh("a", false);
    let result = wasp_translate::call::transform_call(
        &mut store,
        &mut state,
        None,
        &ConcreteType::simple(ty),
        &ConcreteMethod { entity: m, generics: vec![] },
        vec![Expr::Var(a.clone())],
        true,
        None,
    )
    .unwrap();

    assert_eq!(
        result,
        Expr::Application {
            func: Box::new(Expr::ItemGetString {
                obj: Box::new(Expr::ItemGetString {
                    obj: Box::new(Expr::GlobalAccess(Address::new(["P", "prototype"]))),
                    key: Box::new(Expr::Literal(Literal::String("M".to_string()))),
                }),
                key: Box::new(Expr::Literal(Literal::String("call".to_string()))),
            }),
            args: vec![Expr::This, Expr::Var(a)],
        }
    );
}

/// Property 8: `CurriedFuncArg(3)` argument shaping wraps a plain
/// argument into a 3-ary lambda that re-applies it one parameter at a
/// time.
#[test]
fn curried_func_arg_shaping_wraps_the_argument_into_an_n_ary_lambda() {
    let mut store = MemoryMetadataStore::new();
    let ty = TypeId(8);
    let method = MethodId(1);
    store.queue_method(
        ty,
        method,
        member("Apply3", CompilationKind::Static(Address::new(["N", "Apply3"]))),
        Expr::Undefined,
    );
    store.add_compiled_method(
        ty,
        method,
        CompileOptions { func_args: Some(vec![FuncArgShape::Curried(3)]), ..CompileOptions::default() },
        Expr::Undefined,
    );

    let mut state = TranslatorState::new(GraphNode::EntryPointNode, false);
    let f = Id::fresh("f", false);
    let result = wasp_translate::translate_expr(&mut store, &mut state, call(ty, method, vec![Expr::Var(f.clone())])).unwrap();

    let Expr::Application { args, .. } = result else { panic!("expected an Application") };
    assert_eq!(args.len(), 1);
    let Expr::Lambda { params, body } = &args[0] else { panic!("expected a lambda wrapper") };
    assert_eq!(params.len(), 3);

    let mut cursor = body.as_ref();
    let mut applied = Vec::new();
    while let Expr::Application { func, args } = cursor {
        if args.len() != 1 {
            break;
        }
        applied.push(args[0].clone());
        cursor = func.as_ref();
    }
    assert_eq!(cursor, &Expr::Var(f));
    applied.reverse();
    assert_eq!(applied, params.iter().cloned().map(Expr::Var).collect::<Vec<_>>());
}

struct AlwaysFallback;

impl Macro for AlwaysFallback {
    fn translate_call(&self, _request: &MacroRequest) -> MacroResult {
        MacroResult::Fallback
    }

    fn translate_ctor(&self, request: &MacroRequest) -> MacroResult {
        self.translate_call(request)
    }
}

/// Property 9: a macro that always returns `Fallback` substitutes the
/// inline body when one is supplied, and surfaces a translation error
/// when it is not.
#[test]
fn macro_fallback_chain_substitutes_or_errors_depending_on_the_fallback_kind() {
    let mut store = MemoryMetadataStore::new();
    let ty = TypeId(9);
    store.register_macro("AlwaysFallback", Box::new(AlwaysFallback));

    let with_fallback = MethodId(1);
    let x = Id::fresh("x", false);
    store.queue_method(
        ty,
        with_fallback,
        member(
            "WithFallback",
            CompilationKind::Macro { macro_type: "AlwaysFallback".to_string(), parameter: None, fallback: Some(Box::new(CompilationKind::Inline)) },
        ),
        Expr::Lambda { params: vec![x.clone()], body: Box::new(Expr::Var(x)) },
    );

    let mut state = TranslatorState::new(GraphNode::EntryPointNode, false);
    let result =
        wasp_translate::translate_expr(&mut store, &mut state, call(ty, with_fallback, vec![Expr::Literal(Literal::Int(5))])).unwrap();
    assert_eq!(result, Expr::Literal(Literal::Int(5)));

    let no_fallback = MethodId(2);
    store.queue_method(
        ty,
        no_fallback,
        member("NoFallback", CompilationKind::Macro { macro_type: "AlwaysFallback".to_string(), parameter: None, fallback: None }),
        Expr::Undefined,
    );
    let mut state2 = TranslatorState::new(GraphNode::EntryPointNode, false);
    let result2 = wasp_translate::translate_expr(&mut store, &mut state2, call(ty, no_fallback, vec![]));
    assert!(result2.is_err());
}

/// Property 10: a record with an absent optional field emits an object
/// whose key for that field is elided via `Runtime.DeleteEmptyFields`.
#[test]
fn record_construction_elides_absent_optional_fields_through_delete_empty_fields() {
    let js_fields = vec![("A".to_string(), "A".to_string()), ("B".to_string(), "B".to_string())];
    let optional = vec!["B".to_string()];
    let values = vec![("A".to_string(), Expr::Literal(Literal::Int(1))), ("B".to_string(), Expr::Undefined)];

    let result = wasp_translate::custom_type::transform_new_record(&js_fields, &optional, values);

    assert_eq!(
        result,
        Expr::Application {
            func: Box::new(Expr::GlobalAccess(Address::new(["Runtime", "DeleteEmptyFields"]))),
            args: vec![
                Expr::Object(vec![("A".to_string(), Expr::Literal(Literal::Int(1))), ("B".to_string(), Expr::Undefined)]),
                Expr::Array(vec![Expr::Literal(Literal::String("B".to_string()))]),
            ],
        }
    );
}

/// S5: a type check against a well-known error type lowers to `instanceof
/// Error`.
#[test]
fn error_type_check_lowers_to_instanceof_error() {
    let mut store = MemoryMetadataStore::without_graph();
    let exception = TypeId(5);
    store.define_well_known(exception, WellKnownType::ErrorClass);
    let x = Id::fresh("x", false);

    let (result, delayed) =
        wasp_translate::typecheck::transform_type_check(&store, Expr::Var(x.clone()), &ConcreteType::simple(exception), false).unwrap();

    assert!(!delayed);
    assert_eq!(
        result,
        Expr::InstanceOf { expr: Box::new(Expr::Var(x)), ctor: Box::new(Expr::GlobalAccess(Address::new(["Error"]))) }
    );
}

/// S6: a delegate over an `Instance` method binds `this` through
/// `Runtime.BindDelegate`.
#[test]
fn new_delegate_over_an_instance_method_binds_this_through_runtime_bind_delegate() {
    let mut store = MemoryMetadataStore::new();
    let ty = TypeId(6);
    store.define_class(ty, Some(Address::new(["A"])), None, false);
    let m = MethodId(1);
    store.queue_method(ty, m, member("m", CompilationKind::Instance("m".to_string())), Expr::Undefined);

    let mut state = TranslatorState::new(GraphNode::EntryPointNode, false);
    let obj = Id::fresh("obj", false);
    let result = wasp_translate::call::transform_new_delegate(
        &mut store,
        &mut state,
        Some(Expr::Var(obj.clone())),
        &ConcreteType::simple(ty),
        &ConcreteMethod { entity: m, generics: vec![] },
    )
    .unwrap();

    assert_eq!(
        result,
        Expr::Application {
            func: Box::new(Expr::GlobalAccess(Address::new(["Runtime", "BindDelegate"]))),
            args: vec![
                Expr::ItemGetString {
                    obj: Box::new(Expr::GlobalAccess(Address::new(["A", "prototype"]))),
                    key: Box::new(Expr::Literal(Literal::String("m".to_string()))),
                },
                Expr::Var(obj),
            ],
        }
    );
}

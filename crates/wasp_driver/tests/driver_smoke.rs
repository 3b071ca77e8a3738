//! End-to-end exercise of the Driver loop (§4.5) against a hand-built
//! store, covering a constructor, a static constructor, a plain method,
//! an interface implementation, and the entry point in one pass.

use wasp_ir::{Address, BinaryOp, ConcreteType, CtorId, Expr, FieldId, Literal, MethodId, TypeId};
use wasp_meta::{CompilationKind, FieldLookup, MemberInfo, MemberState, MemoryMetadataStore};

fn member(name: &str, kind: CompilationKind) -> MemberInfo {
    MemberInfo { name: name.to_string(), signature: format!("{name}()"), kind }
}

#[test]
fn compiles_a_full_demo_program_in_one_run() {
    let mut store = MemoryMetadataStore::new();

    let counter = TypeId(10);
    store.define_class(counter, Some(Address::new(["Demo", "Counter"])), None, false);
    let field = FieldId(1);
    store.define_field(counter, field, FieldLookup::InstanceField { name: "value".to_string(), readonly: false });

    let ctor = CtorId(1);
    store.queue_constructor(
        counter,
        ctor,
        member("Counter", CompilationKind::Constructor(Address::new(["Demo", "Counter"]))),
        Expr::FieldSet {
            obj: Some(Box::new(Expr::This)),
            concrete_type: ConcreteType::simple(counter),
            field,
            value: Box::new(Expr::Literal(Literal::Int(0))),
        },
    );

    store.queue_static_constructor(
        counter,
        member("cctor", CompilationKind::Static(Address::new(["Demo", "Counter", "cctor"]))),
        Expr::Undefined,
    );

    let double = MethodId(1);
    store.queue_method(
        counter,
        double,
        member("Double", CompilationKind::Static(Address::new(["Demo", "Counter", "Double"]))),
        Expr::Binary {
            left: Box::new(Expr::Literal(Literal::Int(21))),
            op: BinaryOp::Add,
            right: Box::new(Expr::Literal(Literal::Int(21))),
        },
    );

    let iface = TypeId(11);
    let iface_method = MethodId(2);
    store.queue_implementation(
        counter,
        iface,
        iface_method,
        member("Disposable.Dispose", CompilationKind::Instance("Dispose".to_string())),
        Expr::Undefined,
    );

    store.set_entry_point(Expr::Application {
        func: Box::new(Expr::GlobalAccess(Address::new(["Demo", "Counter", "Double"]))),
        args: Vec::new(),
    });

    let report = wasp_driver::run(&mut store);

    assert_eq!(report.constructors_compiled, 1);
    assert_eq!(report.static_constructors_compiled, 1);
    assert_eq!(report.methods_compiled, 1);
    assert_eq!(report.implementations_compiled, 1);
    assert!(report.entry_point_compiled);
    assert_eq!(report.total_failed(), 0);
    assert!(store.errors().is_empty());

    assert!(matches!(store.ctor_state(counter, ctor), Some(MemberState::Compiled { .. })));
    assert!(matches!(store.static_ctor_state(counter), Some(MemberState::Compiled { .. })));
    assert!(matches!(store.method_state(counter, double), Some(MemberState::Compiled { .. })));
    assert!(matches!(store.implementation_state(counter, iface, iface_method), Some(MemberState::Compiled { .. })));
}

#[test]
fn a_failing_member_is_marked_failed_without_blocking_the_rest() {
    let mut store = MemoryMetadataStore::new();
    let ty = TypeId(20);

    let broken = MethodId(1);
    store.queue_method(ty, broken, member("Broken", CompilationKind::Static(Address::new(["Demo", "Broken"]))), Expr::Base);

    let fine = MethodId(2);
    store.queue_method(
        ty,
        fine,
        member("Fine", CompilationKind::Static(Address::new(["Demo", "Fine"]))),
        Expr::Literal(Literal::Int(1)),
    );

    let report = wasp_driver::run(&mut store);

    assert_eq!(report.methods_failed, 1);
    assert_eq!(report.methods_compiled, 1);
    assert_eq!(store.errors().len(), 1);
    assert!(matches!(store.method_state(ty, broken), Some(MemberState::Failed { .. })));
    assert!(matches!(store.method_state(ty, fine), Some(MemberState::Compiled { .. })));
}

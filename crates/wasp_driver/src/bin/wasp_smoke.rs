//! Thin smoke-test binary: wires a hand-built in-memory metadata store
//! with a handful of queued members, runs the Driver to completion, and
//! prints what it compiled. Stands in for a real front end, which is out
//! of scope here (§1 "Non-goals").

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::info;
use wasp_ir::{Address, BinaryOp, CtorId, Expr, FieldId, Literal, MethodId, TypeId};
use wasp_meta::{CompilationKind, FieldLookup, MemberInfo, MemoryMetadataStore};

#[derive(Parser)]
#[command(name = "wasp-smoke", about = "Run the translation pipeline over a demo program", version)]
struct Args {
    /// Print each compiled member's IR with `{:#?}` after the run.
    #[arg(long)]
    dump: bool,

    /// Print accumulated errors and warnings as JSON instead of log lines.
    #[arg(long)]
    json: bool,
}

fn demo_store() -> MemoryMetadataStore {
    let mut store = MemoryMetadataStore::new();

    let point = TypeId(1);
    store.define_class(point, Some(Address::new(["Demo", "Point"])), None, false);

    let add_field = FieldId(1);
    store.define_field(point, add_field, FieldLookup::InstanceField { name: "x".to_string(), readonly: false });

    let ctor = CtorId(1);
    store.queue_constructor(
        point,
        ctor,
        MemberInfo {
            name: "Point".to_string(),
            signature: "Point(x)".to_string(),
            kind: CompilationKind::Constructor(Address::new(["Demo", "Point"])),
        },
        Expr::FieldSet {
            obj: Some(Box::new(Expr::This)),
            concrete_type: wasp_ir::ConcreteType::simple(point),
            field: add_field,
            value: Box::new(Expr::Literal(Literal::Int(0))),
        },
    );

    let sum = MethodId(1);
    store.queue_method(
        point,
        sum,
        MemberInfo {
            name: "Sum".to_string(),
            signature: "Sum(a, b)".to_string(),
            kind: CompilationKind::Static(Address::new(["Demo", "Point", "Sum"])),
        },
        Expr::Binary {
            left: Box::new(Expr::Literal(Literal::Int(1))),
            op: BinaryOp::Add,
            right: Box::new(Expr::Literal(Literal::Int(2))),
        },
    );

    store.set_entry_point(Expr::Application {
        func: Box::new(Expr::GlobalAccess(Address::new(["Demo", "Point", "Sum"]))),
        args: Vec::new(),
    });

    store
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut store = demo_store();
    info!("running driver over demo program");
    let report = wasp_driver::run(&mut store);

    info!(
        "compiled {} method(s), {} constructor(s), {} static constructor(s), {} implementation(s), entry point: {}",
        report.methods_compiled,
        report.constructors_compiled,
        report.static_constructors_compiled,
        report.implementations_compiled,
        report.entry_point_compiled,
    );
    if args.json {
        let json = wasp_meta::diagnostics_to_json(store.errors(), store.warnings())?;
        println!("{json}");
    } else if report.total_failed() > 0 {
        for err in store.errors() {
            log::error!("{err}");
        }
    }

    if args.dump {
        if let Some(wasp_meta::MemberState::Compiled { body, .. }) = store.method_state(TypeId(1), MethodId(1)) {
            println!("{body:#?}");
        }
    }

    Ok(())
}

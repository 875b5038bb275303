//! Container behaviour after assembly: laziness, sharing, multi-bindings,
//! wiring failures and the recorded dependency graph

use crate::test_utils::{
    Builds, Clock, Codec, FixedClock, Greeter, JsonCodec, SystemClock, YamlCodec,
    clock_candidate, greeter_candidate, json_codec_entry, test_config,
};
use keel_application::domain_services::Vertex;
use keel_application::ports::ListScan;
use keel_domain::ports::{Binder, InjectorExt, Module};
use keel_domain::{BindingKey, Candidate, DeclaredTag, Error, Factory, Result, TypeTag};
use keel_infrastructure::config::{AssemblyConfig, ConfigBuilder};
use keel_infrastructure::{AppContext, Assembler};
use std::sync::Arc;
use std::time::Duration;

fn assemble(candidates: Vec<Candidate>) -> Result<AppContext> {
    Assembler::new(test_config())
        .scan(ListScan::new(candidates))
        .assemble()
}

fn fixed_clock_candidate(value: u64) -> Candidate {
    Candidate::of::<FixedClock>()
        .constructor(move |_| Ok(FixedClock(value)))
        .exposing::<dyn Clock>(|it| it)
        .tag(DeclaredTag::singleton().alias::<dyn Clock>())
        .build()
}

fn clock_vertex() -> Vertex {
    Vertex::new(
        BindingKey::of::<dyn Clock>(),
        Some(TypeTag::of::<SystemClock>()),
    )
}

fn greeter_vertex() -> Vertex {
    Vertex::new(BindingKey::of::<Greeter>(), Some(TypeTag::of::<Greeter>()))
}

struct FixedClockModule(u64);

impl Module for FixedClockModule {
    fn name(&self) -> &str {
        "fixed-clock"
    }

    fn configure(&self, binder: &mut dyn Binder) -> Result<()> {
        binder.install(fixed_clock_candidate(self.0))
    }
}

#[test]
fn test_singleton_is_built_once_on_first_lookup() {
    let builds = Builds::default();
    let context = assemble(vec![clock_candidate(&builds, vec![])]).expect("assemble");
    assert_eq!(builds.count(), 0, "singletons are lazy");

    let first = context.container().get::<dyn Clock>().expect("clock");
    let second = context.container().get::<dyn Clock>().expect("clock");

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(builds.count(), 1);
}

#[test]
fn test_concurrent_first_lookups_build_once() {
    let builds = Builds::default();
    let slow = Candidate::of::<SystemClock>()
        .constructor({
            let builds = builds.clone();
            move |_| {
                std::thread::sleep(Duration::from_millis(20));
                Ok(SystemClock {
                    serial: builds.bump(),
                })
            }
        })
        .exposing::<dyn Clock>(|it| it)
        .tag(DeclaredTag::singleton().alias::<dyn Clock>())
        .build();
    let context = assemble(vec![slow]).expect("assemble");
    let container = context.container();

    std::thread::scope(|scope| {
        let lookups: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| container.get::<dyn Clock>().map(|clock| clock.now())))
            .collect();
        for lookup in lookups {
            assert_eq!(lookup.join().expect("thread").expect("clock"), 1_000);
        }
    });
    assert_eq!(builds.count(), 1);
}

#[test]
fn test_dependency_is_injected_into_consumer() {
    let builds = Builds::default();
    let context = assemble(vec![clock_candidate(&builds, vec![]), greeter_candidate()])
        .expect("assemble");

    let greeter = context.container().get::<Greeter>().expect("greeter");
    let clock = context.container().get::<dyn Clock>().expect("clock");

    assert_eq!(greeter.clock.now(), 1_000);
    assert_eq!(builds.count(), 1, "greeter and lookup share the clock");
    assert!(Arc::ptr_eq(&greeter.clock, &clock));
}

#[test]
fn test_missing_dependency_names_the_consumer() {
    let context = assemble(vec![greeter_candidate()]).expect("wiring is checked lazily");

    let error = context.container().get::<Greeter>().expect_err("no clock bound");
    match &error {
        Error::MissingBinding { key, consumer } => {
            assert_eq!(key, "dyn Clock");
            assert_eq!(consumer.as_deref(), Some("Greeter"));
        }
        other => panic!("Expected MissingBinding, got {other}"),
    }
    assert!(error.to_string().contains("required by Greeter"));
}

#[test]
fn test_eager_validation_fails_assembly_on_missing_dependency() {
    let config = ConfigBuilder::new()
        .with_application_name("orders")
        .with_assembly(AssemblyConfig {
            eager_validation: true,
            ..AssemblyConfig::default()
        })
        .build();

    let error = Assembler::new(config)
        .scan(ListScan::new(vec![greeter_candidate()]))
        .assemble()
        .expect_err("greeter cannot be built");
    assert!(error.is_missing_binding());
}

#[test]
fn test_expose_impl_serves_one_instance_under_both_keys() {
    let builds = Builds::default();
    let exposed = clock_candidate(&builds, vec![])
        .tagged(DeclaredTag::new("documentation").with("note", "foreign marker"));
    let context = assemble(vec![exposed]).expect("assemble");
    assert!(
        context.container().try_get::<SystemClock>().expect("lookup").is_none(),
        "implementation key is only bound with expose_impl"
    );

    let builds = Builds::default();
    let candidate = Candidate::of::<SystemClock>()
        .constructor({
            let builds = builds.clone();
            move |_| {
                Ok(SystemClock {
                    serial: builds.bump(),
                })
            }
        })
        .exposing::<dyn Clock>(|it| it)
        .tag(
            DeclaredTag::singleton()
                .alias::<dyn Clock>()
                .with("expose_impl", true),
        )
        .build();
    let context = assemble(vec![candidate]).expect("assemble");

    let concrete = context.container().get::<SystemClock>().expect("impl");
    context.container().get::<dyn Clock>().expect("alias");
    assert_eq!(concrete.serial, 1);
    assert_eq!(builds.count(), 1);
}

#[test]
fn test_named_bindings_are_distinct_keys() {
    let builds = Builds::default();
    let primary = fixed_clock_candidate(1).tagged(DeclaredTag::named("primary"));
    let backup = fixed_clock_candidate(2).tagged(DeclaredTag::named("backup"));
    let context = assemble(vec![primary, backup, clock_candidate(&builds, vec![])])
        .expect("named keys never conflict with the unqualified key");

    let container = context.container();
    assert_eq!(container.get_named::<dyn Clock>("primary").expect("primary").now(), 1);
    assert_eq!(container.get_named::<dyn Clock>("backup").expect("backup").now(), 2);
    assert_eq!(container.get::<dyn Clock>().expect("unqualified").now(), 1_000);
    assert!(container.get_named::<dyn Clock>("spare").is_err());
}

#[test]
fn test_set_members_resolve_in_registration_order() {
    let json = Candidate::of::<JsonCodec>()
        .constructor(|_| Ok(JsonCodec))
        .exposing::<dyn Codec>(|it| it)
        .tag(DeclaredTag::set_member().alias::<dyn Codec>())
        .build();
    let yaml = Candidate::of::<YamlCodec>()
        .constructor(|_| Ok(YamlCodec))
        .exposing::<dyn Codec>(|it| it)
        .tag(DeclaredTag::set_member().alias::<dyn Codec>())
        .build();
    let context = assemble(vec![yaml, json]).expect("assemble");

    let names: Vec<_> = context
        .container()
        .get_set::<dyn Codec>()
        .expect("set")
        .iter()
        .map(|codec| codec.name())
        .collect();
    assert_eq!(names, vec!["yaml", "json"]);
}

#[test]
fn test_duplicate_map_key_fails_assembly() {
    let error = assemble(vec![json_codec_entry("default"), json_codec_entry("default")])
        .expect_err("same key twice");
    assert!(matches!(error, Error::DuplicateMapKey { .. }));
}

#[test]
fn test_conflicting_main_bindings_fail_assembly() {
    let builds = Builds::default();
    let error = Assembler::new(test_config())
        .scan(ListScan::new(vec![clock_candidate(&builds, vec![])]))
        .module(FixedClockModule(7))
        .assemble()
        .expect_err("two clocks");

    match error {
        Error::BindingConflict {
            key,
            existing,
            incoming,
        } => {
            assert_eq!(key, "dyn Clock");
            assert_eq!(existing, "SystemClock");
            assert_eq!(incoming, "FixedClock");
        }
        other => panic!("Expected BindingConflict, got {other}"),
    }
}

#[test]
fn test_override_module_replaces_binding_in_override_mode() {
    let builds = Builds::default();
    let context = Assembler::new(test_config())
        .scan(ListScan::new(vec![clock_candidate(&builds, vec![]), greeter_candidate()]))
        .override_module(FixedClockModule(7))
        .override_mode(true)
        .assemble()
        .expect("assemble");

    let greeter = context.container().get::<Greeter>().expect("greeter");
    assert_eq!(greeter.clock.now(), 7);
    assert_eq!(builds.count(), 0);
}

#[test]
fn test_eager_singleton_is_built_at_assembly() {
    let builds = Builds::default();
    let _context = assemble(vec![clock_candidate(&builds, vec![DeclaredTag::eager()])])
        .expect("assemble");
    assert_eq!(builds.count(), 1);
}

struct Broken;

#[test]
fn test_failing_eager_singleton_aborts_assembly() {
    let broken = Candidate::of::<Broken>()
        .constructor(|_| Err(Error::store("database unreachable")))
        .tag(DeclaredTag::singleton())
        .tag(DeclaredTag::eager())
        .build();

    let error = assemble(vec![broken]).expect_err("eager build fails");
    assert!(matches!(error, Error::Store { .. }));
}

#[test]
fn test_provider_scopes() {
    let transient_builds = Builds::default();
    let transient = Candidate::of::<SystemClock>()
        .constructor({
            let builds = transient_builds.clone();
            move |_| {
                Ok(SystemClock {
                    serial: builds.bump(),
                })
            }
        })
        .tag(DeclaredTag::provider::<SystemClock>())
        .build();

    let singleton_builds = Builds::default();
    let singleton = Candidate::of::<FixedClock>()
        .constructor({
            let builds = singleton_builds.clone();
            move |_| {
                builds.bump();
                Ok(FixedClock(3))
            }
        })
        .tag(DeclaredTag::provider::<FixedClock>().with("scope", "singleton"))
        .build();

    let context = assemble(vec![transient, singleton]).expect("assemble");
    assert_eq!(singleton_builds.count(), 1, "singleton scope builds at finalize");
    assert_eq!(transient_builds.count(), 0);

    let container = context.container();
    let first = container.get::<SystemClock>().expect("first");
    let second = container.get::<SystemClock>().expect("second");
    assert_eq!((first.serial, second.serial), (1, 2));

    container.get::<FixedClock>().expect("fixed");
    assert_eq!(singleton_builds.count(), 1);
}

#[test]
fn test_provider_cycle_is_reported() {
    #[derive(Debug)]
    struct Ping;
    #[derive(Debug)]
    struct Pong;

    let ping = Candidate::of::<Ping>()
        .constructor(|injector| {
            injector.get::<Pong>()?;
            Ok(Ping)
        })
        .tag(DeclaredTag::singleton())
        .build();
    let pong = Candidate::of::<Pong>()
        .constructor(|injector| {
            injector.get::<Ping>()?;
            Ok(Pong)
        })
        .tag(DeclaredTag::singleton())
        .build();
    let context = assemble(vec![ping, pong]).expect("assemble");

    let error = context.container().get::<Ping>().expect_err("cycle");
    match error {
        Error::CircularDependency { chain } => assert_eq!(chain, "Ping -> Pong -> Ping"),
        other => panic!("Expected CircularDependency, got {other}"),
    }
}

#[test]
fn test_graph_records_resolution_edges() {
    let builds = Builds::default();
    let context = assemble(vec![
        clock_candidate(&builds, vec![]),
        greeter_candidate(),
        json_codec_entry("json"),
    ])
    .expect("assemble");
    let graph = context.graph();
    let codec = Vertex::new(
        BindingKey::map_of::<dyn Codec>(),
        Some(TypeTag::of::<JsonCodec>()),
    );

    assert!(graph.is_orphan(&greeter_vertex()));
    assert!(graph.is_orphan(&codec));

    context.container().get::<Greeter>().expect("greeter");
    context.container().get_map::<dyn Codec>().expect("codecs");

    assert_eq!(graph.dependencies(&greeter_vertex()), vec![clock_vertex()]);
    assert_eq!(graph.consumers(&clock_vertex()), vec![greeter_vertex()]);
    assert_eq!(
        graph.consumers(&codec),
        vec![Vertex::of_key(BindingKey::map_of::<dyn Codec>())]
    );
    assert!(!graph.is_orphan(&codec));
}

#[test]
fn test_rendered_graph_lists_consumers_and_orphans() {
    let builds = Builds::default();
    let config = ConfigBuilder::new()
        .with_application_name("orders")
        .with_assembly(AssemblyConfig {
            render_graph: true,
            ..AssemblyConfig::default()
        })
        .build();
    let context = Assembler::new(config)
        .scan(ListScan::new(vec![clock_candidate(&builds, vec![]), greeter_candidate()]))
        .without_store_module()
        .assemble()
        .expect("assemble");
    context.container().get::<Greeter>().expect("greeter");

    let rendered = context.render_graph();
    assert!(rendered.contains("Greeter ──▶ dyn Clock [SystemClock]"), "{rendered}");
    assert!(rendered.contains("ApplicationName (orphan)"), "{rendered}");
}

/// Built per call from a runtime name and the injected clock
#[derive(Debug)]
struct Greeting {
    name: String,
    stamp: u64,
}

fn greeting_factory_candidate(factory_builds: &Builds) -> Candidate {
    let factory_builds = factory_builds.clone();
    Candidate::of::<Factory<String, Greeting>>()
        .constructor(move |injector| {
            factory_builds.bump();
            let clock = injector.get::<dyn Clock>()?;
            Ok(Factory::new(move |name: String| {
                Ok(Greeting {
                    name,
                    stamp: clock.now(),
                })
            }))
        })
        .tag(DeclaredTag::factory::<String, Greeting>())
        .build()
}

#[test]
fn test_factory_creates_a_new_product_per_call() {
    let clock_builds = Builds::default();
    let factory_builds = Builds::default();
    let context = assemble(vec![
        clock_candidate(&clock_builds, vec![]),
        greeting_factory_candidate(&factory_builds),
    ])
    .expect("assemble");

    let factory = context
        .container()
        .get_factory::<String, Greeting>()
        .expect("factory");
    let ada = factory.create("ada".to_string()).expect("ada");
    let grace = factory.create("grace".to_string()).expect("grace");
    let again = factory.create("ada".to_string()).expect("ada again");

    assert_eq!(ada.name, "ada");
    assert_eq!(grace.name, "grace");
    assert_eq!((ada.stamp, grace.stamp), (1_000, 1_000));
    assert!(!Arc::ptr_eq(&ada, &again));

    let same = context
        .container()
        .get_factory::<String, Greeting>()
        .expect("factory again");
    assert!(Arc::ptr_eq(&factory, &same));
    assert_eq!(factory_builds.count(), 1);
    assert_eq!(clock_builds.count(), 1);
}

#[test]
fn test_factory_product_is_not_bound_itself() {
    let context = assemble(vec![
        clock_candidate(&Builds::default(), vec![]),
        greeting_factory_candidate(&Builds::default()),
    ])
    .expect("assemble");

    let error = context.container().get::<Greeting>().expect_err("only the factory is bound");
    assert!(error.is_missing_binding());
    assert!(context.container().try_get::<Greeting>().expect("lookup").is_none());

    context
        .container()
        .get_factory::<String, Greeting>()
        .expect("factory");
    let factory_vertex = Vertex::new(
        BindingKey::of::<Factory<String, Greeting>>(),
        Some(TypeTag::of::<Factory<String, Greeting>>()),
    );
    assert!(context.graph().edges().contains(&(factory_vertex, clock_vertex())));
}

//! A small program in compiled form.
//!
//! What a compiler would emit for roughly:
//!
//! ```text
//! class Greeter { static { System.out.println("greeter ready"); } String greet(String n) { return "Hello, " + n; } }
//! class LoudGreeter extends Greeter { String greet(String n) { return super.greet(n).toUpperCase() + "!"; } }
//!
//! static void main(String[] args) {
//!     System.out.println("demo starting with " + args.length + " args");
//!     for (int tick = 0; tick < ITERATIONS; tick++) {
//!         Thread.sleep(DELAY);
//!         System.out.println("tick " + tick);
//!     }
//!     System.out.println(new LoudGreeter().greet("world"));
//!     System.out.println("grid is " + new int[2][].getClass().getName());
//! }
//! ```
//!
//! The main body is written the way compiled code drives the continuation
//! engine: the loop counter is saved on the operand stack when `sleep`
//! suspends and restored when the body replays.

use crate::runtime::{CompiledUnit, Runtime};
use class_registry::{class_name_of, ClassRecord, MethodEntry, PrimitiveKind};
use continuation::blocking;
use continuation::{Step, Thread};
use core_types::{Result, RuntimeError, Value};
use platform::CharacterSink;
use std::rc::Rc;

const LITERALS: [&str; 7] = [
    "demo starting with ",
    " args",
    "tick ",
    "world",
    "Hello, ",
    "greeter ready",
    "grid is ",
];
const STARTING: usize = 0;
const ARGS: usize = 1;
const TICK: usize = 2;
const WORLD: usize = 3;
const HELLO: usize = 4;
const GREETER_READY: usize = 5;
const GRID: usize = 6;

/// Writes `text` and a line feed one code unit at a time.
fn print_line(sink: &CharacterSink, text: &str) {
    for unit in text.encode_utf16() {
        sink.write(unit);
    }
    sink.write(0x0A);
}

/// The demo program, parameterized by its loop bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoProgram {
    /// Number of ticks printed
    pub iterations: u32,
    /// Virtual milliseconds slept before each tick
    pub delay_ms: u64,
}

impl DemoProgram {
    /// Creates the program.
    pub fn new(iterations: u32, delay_ms: u64) -> Self {
        Self {
            iterations,
            delay_ms,
        }
    }

    /// Declares, loads and links the program's classes into `runtime`.
    pub fn load(&self, runtime: &Runtime) -> Result<()> {
        let classes = runtime.classes();
        let greeter = classes.declare_class("$demo_Greeter");
        let loud = classes.declare_class("$demo_LoudGreeter");

        let strings = runtime.strings().clone();
        let stdout = runtime.stdout().clone();
        let greeter_init = move |_: &class_registry::ClassRegistry| -> Result<()> {
            print_line(&stdout, &strings.get(GREETER_READY)?);
            Ok(())
        };

        let strings = runtime.strings().clone();
        let greet = MethodEntry::new(
            "greet",
            Rc::new(move |_, _, args| {
                let name = args.first().and_then(Value::as_str).unwrap_or_default();
                Ok(Value::string(format!("{}{}", strings.get(HELLO)?, name)))
            }),
        );

        let shout = MethodEntry::aliased(
            &["greet", "shout"],
            Rc::new(move |registry, this, args| {
                let base = registry.resolve_method(greeter, "greet").ok_or_else(|| {
                    RuntimeError::MethodNotFound {
                        class: greeter,
                        selector: "greet".to_string(),
                    }
                })?;
                let text = base(registry, this, args)?;
                let loud_text = text.as_str().unwrap_or_default().to_uppercase();
                Ok(Value::string(format!("{}!", loud_text)))
            }),
        );

        let unit = CompiledUnit::new()
            .with_strings(LITERALS)
            .with_class(
                ClassRecord::new(greeter, "demo.Greeter")
                    .with_superclass(runtime.object_class())
                    .with_static_init(greeter_init)
                    .with_alias("Greeter_new")
                    .with_method(greet),
            )
            .with_class(
                ClassRecord::new(loud, "demo.LoudGreeter")
                    .with_superclass(greeter)
                    .with_static_init(move |registry| registry.initialize(greeter))
                    .with_alias("LoudGreeter_new")
                    .with_method(shout),
            );
        runtime.load_unit(unit)?;

        let symbols = classes.symbols();
        symbols.define("Greeter_new", Rc::new(move |registry, _| registry.instantiate(greeter)));
        symbols.define("LoudGreeter_new", Rc::new(move |registry, _| registry.instantiate(loud)));
        Ok(())
    }

    /// Starts `main` with `args` on a new thread. The program runs until it
    /// first sleeps; drive the runtime's event loop to finish it.
    pub fn start(&self, runtime: &Runtime, args: &[&str]) -> Result<Thread> {
        let classes = runtime.classes().clone();
        let strings = runtime.strings().clone();
        let stdout = runtime.stdout().clone();
        let event_loop = runtime.event_loop().clone();
        let DemoProgram {
            iterations,
            delay_ms,
        } = *self;

        runtime.start_main(
            move |t, args| {
                let mut tick = if t.is_resuming() {
                    t.pop()?.as_int().unwrap_or(0) as u32
                } else {
                    let count = match args.first() {
                        Some(Value::Array(array)) => array.len(),
                        _ => 0,
                    };
                    let line = format!("{}{}{}", strings.get(STARTING)?, count, strings.get(ARGS)?);
                    print_line(&stdout, &line);
                    0
                };

                while tick < iterations {
                    match blocking::sleep(t, &event_loop, delay_ms)? {
                        Step::Ready(_) => {
                            print_line(&stdout, &format!("{}{}", strings.get(TICK)?, tick));
                            tick += 1;
                        }
                        Step::Suspended => {
                            t.push(Value::Int(tick as i32));
                            return Ok(Value::Void);
                        }
                    }
                }

                let greeter = classes.call_static("LoudGreeter_new", &[])?;
                let world = Value::String(strings.get(WORLD)?);
                let greeting = classes.invoke_virtual(&greeter, "greet", &[world])?;
                print_line(&stdout, greeting.as_str().unwrap_or_default());

                let int = classes.primitive(PrimitiveKind::Int);
                let grid = classes.create_array(classes.array_class(int)?, 2)?;
                let line = format!("{}{}", strings.get(GRID)?, class_name_of(&classes, &grid));
                print_line(&stdout, &line);
                Ok(Value::Int(tick as i32))
            },
            args,
        )
    }
}

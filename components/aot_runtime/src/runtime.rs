//! Runtime orchestration for compiled programs
//!
//! The Runtime struct coordinates all components:
//! - ClassRegistry for class metadata, dispatch and global entry points
//! - StringTable for the unit's interned literals
//! - CharacterSinks for stdout and stderr
//! - EventLoop for resuming suspended threads

use crate::config::{ConsoleMode, RuntimeConfig};
use class_registry::{ClassRecord, ClassRegistry, Slot, OBJECT_CLASS_NAME, STRING_CLASS_NAME};
use continuation::{thread_starter, EventLoop, Thread};
use core_types::{ClassId, Result, Value};
use platform::{CharacterSink, LineWriter, StdioWriter, Stream, StringPool, StringTable, TracingWriter};
use std::rc::Rc;
use tracing::{debug, info};

/// Output of the compiler for one program: its literal list and its
/// descriptor table.
#[derive(Debug, Default)]
pub struct CompiledUnit {
    /// String literals, addressed by index
    pub strings: Vec<String>,
    /// Flat descriptor table, eight slots per class
    pub descriptors: Vec<Slot>,
}

impl CompiledUnit {
    /// Creates an empty unit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the literal list.
    pub fn with_strings<I, S>(mut self, strings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.strings = strings.into_iter().map(Into::into).collect();
        self
    }

    /// Appends the slots of one class.
    pub fn with_class(mut self, record: ClassRecord) -> Self {
        self.descriptors.extend(record.into_slots());
        self
    }

    /// Appends raw descriptor slots.
    pub fn with_descriptors(mut self, slots: Vec<Slot>) -> Self {
        self.descriptors.extend(slots);
        self
    }
}

/// Main runtime that hosts compiled programs
pub struct Runtime {
    config: RuntimeConfig,
    classes: Rc<ClassRegistry>,
    strings: Rc<StringTable>,
    stdout: Rc<CharacterSink>,
    stderr: Rc<CharacterSink>,
    event_loop: Rc<EventLoop>,
    object_class: ClassId,
    string_class: ClassId,
}

impl Runtime {
    /// Create a new runtime instance with sinks chosen by `config.console`
    ///
    /// # Example
    /// ```
    /// use aot_runtime::{Runtime, RuntimeConfig};
    ///
    /// let runtime = Runtime::new(RuntimeConfig::default()).unwrap();
    /// assert!(runtime.classes().find_class("java.lang.String").is_some());
    /// ```
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        match config.console {
            ConsoleMode::Tracing => Self::with_writers(config, TracingWriter, TracingWriter),
            ConsoleMode::Stdio => Self::with_writers(config, StdioWriter, StdioWriter),
        }
    }

    /// Create a runtime whose sinks write to the given line writers
    pub fn with_writers<O, E>(config: RuntimeConfig, stdout: O, stderr: E) -> Result<Self>
    where
        O: LineWriter + 'static,
        E: LineWriter + 'static,
    {
        let classes = Rc::new(ClassRegistry::new());
        let object_class = classes.declare_class("$java_lang_Object");
        let string_class = classes.declare_class("$java_lang_String");
        classes.load_classes(vec![
            ClassRecord::new(object_class, OBJECT_CLASS_NAME),
            ClassRecord::new(string_class, STRING_CLASS_NAME).with_superclass(object_class),
        ])?;
        debug!(console = ?config.console, "runtime created");

        Ok(Self {
            config,
            classes,
            strings: Rc::new(StringTable::new(Rc::new(StringPool::new()))),
            stdout: Rc::new(CharacterSink::new(Stream::Stdout, stdout)),
            stderr: Rc::new(CharacterSink::new(Stream::Stderr, stderr)),
            event_loop: Rc::new(EventLoop::new()),
            object_class,
            string_class,
        })
    }

    /// The configuration this runtime was created with
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// The class registry
    pub fn classes(&self) -> &Rc<ClassRegistry> {
        &self.classes
    }

    /// The string literal table
    pub fn strings(&self) -> &Rc<StringTable> {
        &self.strings
    }

    /// Sink behind `put_stdout`
    pub fn stdout(&self) -> &Rc<CharacterSink> {
        &self.stdout
    }

    /// Sink behind `put_stderr`
    pub fn stderr(&self) -> &Rc<CharacterSink> {
        &self.stderr
    }

    /// Get access to the event loop for scheduling resumes and timers
    pub fn event_loop(&self) -> &Rc<EventLoop> {
        &self.event_loop
    }

    /// The root class `java.lang.Object`
    pub fn object_class(&self) -> ClassId {
        self.object_class
    }

    /// The class of string values
    pub fn string_class(&self) -> ClassId {
        self.string_class
    }

    /// Loads a compiled unit: populates the string table, then bootstraps
    /// every class in the descriptor table.
    ///
    /// # Errors
    ///
    /// Any bootstrap error. The string table is already replaced when
    /// bootstrap fails; no class from the unit has been loaded.
    pub fn load_unit(&self, unit: CompiledUnit) -> Result<()> {
        let CompiledUnit {
            strings,
            descriptors,
        } = unit;
        self.strings.populate(strings);
        let slots = descriptors.len();
        self.classes.bootstrap(descriptors)?;
        info!(strings = self.strings.len(), slots, "compiled unit loaded");
        Ok(())
    }

    /// Literal `index` of the loaded unit as a string value
    pub fn string(&self, index: usize) -> Result<Value> {
        Ok(Value::String(self.strings.get(index)?))
    }

    /// Emits one UTF-16 code unit on stdout
    pub fn put_stdout(&self, code_unit: u16) {
        self.stdout.write(code_unit);
    }

    /// Emits one UTF-16 code unit on stderr
    pub fn put_stderr(&self, code_unit: u16) {
        self.stderr.write(code_unit);
    }

    /// Wraps a program entry point so that calling it with host arguments
    /// starts a thread running `f` with a `String[]` argument.
    pub fn main_starter<F>(&self, f: F) -> impl Fn(&[&str]) -> Result<Thread>
    where
        F: Fn(&Thread, &[Value]) -> Result<Value> + 'static,
    {
        let classes = self.classes.clone();
        let string_class = self.string_class;
        let start = thread_starter(f);
        move |args: &[&str]| {
            let java_args = args.iter().map(|arg| Value::string(*arg)).collect();
            let array = classes.wrap_array(string_class, java_args)?;
            start(vec![array])
        }
    }

    /// Starts `f` as the program's main thread
    pub fn start_main<F>(&self, f: F, args: &[&str]) -> Result<Thread>
    where
        F: Fn(&Thread, &[Value]) -> Result<Value> + 'static,
    {
        debug!(args = args.len(), "starting main thread");
        self.main_starter(f)(args)
    }

    /// Runs the event loop until no work is left
    pub fn run_event_loop(&self) -> Result<()> {
        self.event_loop.run_until_done()
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .field("classes", &self.classes.len())
            .field("strings", &self.strings.len())
            .field("event_loop", &self.event_loop)
            .finish()
    }
}

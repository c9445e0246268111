//! Public interface for running lilt code.

use crate::{
    analyze::analyze_program,
    builtins,
    env,
    exception_public::Exception,
    heap::{Heap, HeapData, HeapStats},
    intern::{Interns, StaticStrings},
    io::{InputPort, PrintWriter},
    object::Object,
    parse::{is_float_text, is_integer_text, parse_program},
    value::{Value, allocate_list},
    vm::Vm,
};

/// Primary interface for running lilt code.
///
/// `Runner::new` parses and analyzes once; `run` executes the compiled
/// closure tree against a fresh heap and global environment, so one
/// runner can be executed many times (and from many threads, one heap
/// each).
///
/// # Example
/// ```
/// use lilt::{CollectStringPrint, NoInput, Object, Runner};
///
/// let runner = Runner::new("(+ 40 2)", "test.scm", vec![]).unwrap();
/// let result = runner.run(&mut CollectStringPrint::new(), &mut NoInput).unwrap();
/// assert_eq!(result, Some(Object::Int(42)));
/// ```
#[derive(Debug)]
pub struct Runner {
    executor: Executor,
}

impl Runner {
    /// Parses and analyzes the given program.
    ///
    /// `program_args` are the script arguments (conventionally with the
    /// script path or `-` first); they are classified with the
    /// integer/float text classifiers and bound as `argc`/`argv` before
    /// evaluation.
    ///
    /// # Errors
    /// Returns `Exception` if the code cannot be parsed or analyzed.
    pub fn new(code: &str, script_name: &str, program_args: Vec<String>) -> Result<Self, Exception> {
        Executor::new(code, script_name, program_args).map(|executor| Self { executor })
    }

    /// Executes the program to completion.
    ///
    /// `Ok(None)` means the program's final form produced no value (for
    /// example a trailing `define`).
    pub fn run(
        &self,
        print: &mut impl PrintWriter,
        input: &mut impl InputPort,
    ) -> Result<Option<Object>, Exception> {
        self.executor.run(print, input).map(|(object, _)| object)
    }

    /// Executes the program and additionally returns a heap snapshot taken
    /// after the result and the global environment were released.
    ///
    /// Used for testing reference-count hygiene: a leak-free run drains
    /// the heap to zero live objects.
    pub fn run_ref_counts(
        &self,
        print: &mut impl PrintWriter,
        input: &mut impl InputPort,
    ) -> Result<(Option<Object>, HeapStats), Exception> {
        self.executor.run(print, input)
    }
}

/// A program argument, classified once at construction.
#[derive(Debug)]
enum ProgramArg {
    Int(i64),
    Float(f64),
    Symbol(String),
}

/// Applies the integer/float text classifiers to a raw argument;
/// anything non-numeric becomes a symbol.
fn classify_argument(text: &str) -> ProgramArg {
    if is_integer_text(text)
        && let Ok(value) = text.parse()
    {
        return ProgramArg::Int(value);
    }
    if is_float_text(text)
        && let Ok(value) = text.parse()
    {
        return ProgramArg::Float(value);
    }
    ProgramArg::Symbol(text.to_lowercase())
}

/// Lower level interface owning the compiled program.
#[derive(Debug)]
struct Executor {
    program: crate::expressions::NodeLoc,
    interns: Interns,
    args: Vec<ProgramArg>,
}

impl Executor {
    fn new(code: &str, script_name: &str, program_args: Vec<String>) -> Result<Self, Exception> {
        let ast = parse_program(code, script_name).map_err(crate::parse::SyntaxError::into_exception)?;
        let analyzed = analyze_program(&ast, script_name).map_err(crate::parse::SyntaxError::into_exception)?;
        let interns = analyzed.interner.finish(analyzed.functions);
        let args = program_args.iter().map(|arg| classify_argument(arg)).collect();
        Ok(Self {
            program: analyzed.program,
            interns,
            args,
        })
    }

    fn run(
        &self,
        print: &mut impl PrintWriter,
        input: &mut impl InputPort,
    ) -> Result<(Option<Object>, HeapStats), Exception> {
        let mut heap = Heap::new(64);
        let global_env = self.bootstrap(&mut heap)?;

        let outcome = {
            let mut vm = Vm::new(&mut heap, &self.interns, print, input, global_env);
            match vm.execute(&self.program, global_env) {
                Ok(value) => Ok(value),
                Err(err) => {
                    let (frames, truncated) = vm.backtrace_frames();
                    Err(err.into_exception(frames, truncated))
                }
            }
        };
        let value = outcome?;

        let object = value.map(|value| Object::new(value, &mut heap, &self.interns));
        heap.dec_ref(global_env);
        let stats = heap.stats();
        Ok((object, stats))
    }

    /// Creates the global environment: `#t`/`#f`/`nil`, the basic
    /// primitives, and the classified `argc`/`argv` bindings.
    ///
    /// The global environment is created once per run; it is the only
    /// environment with no parent.
    fn bootstrap(&self, heap: &mut Heap) -> Result<crate::heap::HeapId, Exception> {
        let global_env = env::create(heap);
        let bind = |heap: &mut Heap, name: StaticStrings, value: Value| {
            env::define(heap, global_env, name.into(), value)
                .map_err(|err| err.into_exception(Vec::new(), 0))
        };
        for (name, value) in builtins::basic_bindings() {
            bind(heap, name, value)?;
        }

        let argv_values: Vec<Value> = self
            .args
            .iter()
            .map(|arg| match arg {
                ProgramArg::Int(v) => Value::Int(*v),
                ProgramArg::Float(v) => Value::Float(*v),
                ProgramArg::Symbol(text) => Value::Ref(heap.allocate(HeapData::Symbol(text.clone()))),
            })
            .collect();
        let argc = Value::Int(self.args.len() as i64);
        let argv = allocate_list(heap, argv_values);
        bind(heap, StaticStrings::Argc, argc)?;
        bind(heap, StaticStrings::Argv, argv)?;
        Ok(global_env)
    }
}

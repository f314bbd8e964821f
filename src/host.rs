//! Host application integration
//!
//! Embedders expose native capabilities to scripts by implementing
//! [`HostFunction`] and registering the implementation with the evaluator.
//! Registered functions live in the global function namespace next to
//! script-defined functions and are called with already evaluated argument
//! values.
//!
//! The runtime is single threaded; implementations are held behind `Rc`
//! and need no synchronization.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::runtime::value::Value;

/// A native function callable from script code
pub trait HostFunction {
    /// Name the function is registered under
    fn name(&self) -> &str;

    /// One-line description for host-side tooling
    fn description(&self) -> &str {
        ""
    }

    /// Fixed parameter count, `None` for variadic functions
    ///
    /// When set, the evaluator pads missing arguments with null and drops
    /// extras, so `call` always receives exactly this many values.
    fn arity(&self) -> Option<usize> {
        None
    }

    /// Invoke the function with evaluated arguments
    ///
    /// Scripts see the returned value as the call's result; returning an
    /// `Err` aborts the running program with that error.
    fn call(&self, args: &[Value]) -> Result<Value>;
}

/// The `print` builtin
///
/// Writes its arguments separated by single spaces, followed by a newline,
/// and returns null. Strings print raw, without quotes. The output sink is
/// pluggable so embedders and tests can capture output.
pub struct Print {
    sink: Rc<RefCell<dyn Write>>,
}

impl Print {
    /// A `print` writing to standard output
    pub fn to_stdout() -> Self {
        Print {
            sink: Rc::new(RefCell::new(io::stdout())),
        }
    }

    /// A `print` writing to the given sink
    pub fn with_sink(sink: Rc<RefCell<dyn Write>>) -> Self {
        Print { sink }
    }
}

impl HostFunction for Print {
    fn name(&self) -> &str {
        "print"
    }

    fn description(&self) -> &str {
        "Write values to the output sink, space separated, newline terminated"
    }

    fn call(&self, args: &[Value]) -> Result<Value> {
        let mut sink = self.sink.borrow_mut();
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                write!(sink, " ").map_err(write_failed)?;
            }
            write!(sink, "{}", arg).map_err(write_failed)?;
        }
        writeln!(sink).map_err(write_failed)?;
        Ok(Value::Null)
    }
}

fn write_failed(err: io::Error) -> Error {
    Error::internal(format!("print: output sink failed: {}", err))
}

//! Engine construction, registries, and the evaluation entry points.

use std::collections::HashMap;

use tracing::debug;

use crate::builtins::{default_functions, default_operators};
use crate::cancel::CancelToken;
use crate::classify::Classify;
use crate::error::EvalError;
use crate::executor::Execute;
use crate::postfix::ToPostfix;
use crate::scanner::Scanner;
use crate::token::{TokenStack, Value, VarValue};

/// A stack transformation invoked when its operator or function fires.
pub type Handler = Box<dyn Fn(&mut TokenStack) -> Result<(), EvalError> + Send + Sync>;

/// Operator definitions keyed by name.
pub type OperatorTable = HashMap<String, Operator>;

/// Function handlers keyed by name.
pub type FunctionTable = HashMap<String, Handler>;

/// Variable bindings keyed by name.
pub type Variables = HashMap<String, VarValue>;

/// The pipeline an evaluation runs through.
pub type Results<'e> = Execute<'e, ToPostfix<Classify<'e, Scanner<'e>>>>;

/// An operator definition: binding strength plus its handler.
///
/// `left_assoc` is recorded for callers that inspect the table; the
/// converter groups every operator left to right regardless.
pub struct Operator {
    pub precedence: i32,
    pub left_assoc: bool,
    pub handler: Handler,
}

impl Operator {
    pub fn new(
        precedence: i32,
        left_assoc: bool,
        handler: impl Fn(&mut TokenStack) -> Result<(), EvalError> + Send + Sync + 'static,
    ) -> Self {
        Operator {
            precedence,
            left_assoc,
            handler: Box::new(handler),
        }
    }
}

/// Initial tables for an [`Engine`].
#[derive(Default)]
pub struct EngineConfig {
    pub operators: OperatorTable,
    pub functions: FunctionTable,
    pub variables: Variables,
}

impl EngineConfig {
    /// Empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in operator and function tables.
    pub fn with_defaults() -> Self {
        EngineConfig {
            operators: default_operators(),
            functions: default_functions(),
            variables: Variables::new(),
        }
    }
}

/// Rebuild a table with lowercased keys.
fn fold_keys<V>(table: HashMap<String, V>) -> HashMap<String, V> {
    table
        .into_iter()
        .map(|(key, value)| (key.to_lowercase(), value))
        .collect()
}

/// An expression evaluator owning operator, function, and variable
/// tables.
///
/// Evaluation borrows the tables, and registration takes `&mut self`,
/// so tables cannot change while an evaluation is in flight. Separate
/// engines are fully independent and an engine may serve evaluations
/// on several threads at once.
#[derive(Default)]
pub struct Engine {
    operators: OperatorTable,
    functions: FunctionTable,
    variables: Variables,
}

impl Engine {
    /// Build an engine from `config`. Table keys fold to lowercase.
    pub fn new(config: EngineConfig) -> Self {
        Engine {
            operators: fold_keys(config.operators),
            functions: fold_keys(config.functions),
            variables: fold_keys(config.variables),
        }
    }

    /// An engine preloaded with the built-in tables.
    pub fn with_defaults() -> Self {
        Engine::new(EngineConfig::with_defaults())
    }

    /// Register an operator. The name folds to lowercase.
    pub fn register_operator(
        &mut self,
        name: &str,
        precedence: i32,
        left_assoc: bool,
        handler: impl Fn(&mut TokenStack) -> Result<(), EvalError> + Send + Sync + 'static,
    ) -> &mut Self {
        self.operators.insert(
            name.to_lowercase(),
            Operator::new(precedence, left_assoc, handler),
        );
        self
    }

    /// Register a function. The name folds to lowercase.
    pub fn register_function(
        &mut self,
        name: &str,
        handler: impl Fn(&mut TokenStack) -> Result<(), EvalError> + Send + Sync + 'static,
    ) -> &mut Self {
        self.functions.insert(name.to_lowercase(), Box::new(handler));
        self
    }

    /// Bind a variable. The name folds to lowercase.
    pub fn set_variable(&mut self, name: &str, value: impl Into<VarValue>) -> &mut Self {
        self.variables.insert(name.to_lowercase(), value.into());
        self
    }

    /// Evaluate `input`, yielding results as they are produced.
    ///
    /// The stream ends early, without an item, when `cancel` fires.
    pub fn eval<'e>(&'e self, cancel: &CancelToken, input: &'e str) -> Results<'e> {
        debug!(input, "evaluating");
        let scanned = Scanner::new(input, cancel.clone());
        let classified = Classify::new(scanned, &self.operators, &self.functions, cancel.clone());
        let reordered = ToPostfix::new(classified, cancel.clone());
        Execute::new(
            reordered,
            &self.operators,
            &self.functions,
            &self.variables,
            cancel.clone(),
        )
    }

    /// Evaluate and keep at most the first result.
    ///
    /// `Ok(None)` means the evaluation produced nothing, either because
    /// the expression left no value behind or because it was cancelled;
    /// check the token to tell the two apart.
    pub fn eval_single(
        &self,
        cancel: &CancelToken,
        input: &str,
    ) -> Result<Option<Value>, EvalError> {
        match self.eval(cancel, input).next() {
            Some(Ok(value)) => Ok(Some(value)),
            Some(Err(err)) => Err(err),
            None => Ok(None),
        }
    }
}

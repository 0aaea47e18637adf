// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Formula engine - the main entry point for parsing and evaluating formulas

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::ast::Expression;
use crate::compiler::CompilerConfig;
use crate::error::{FormulaError, Result};
use crate::model::{Context, Value};
use crate::parser::parse_with;
use crate::registry::{FunctionRegistry, OperatorRegistry};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lower parsed formulas to closures
    pub allow_compilation: bool,
    /// Report failures and `unknown` results as errors instead of values
    pub strict: bool,
    /// Formula texts kept parsed before the cache is cleared
    pub max_cache_size: usize,
    /// Compiler settings
    pub compiler: CompilerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            allow_compilation: true,
            strict: false,
            max_cache_size: 1000,
            compiler: CompilerConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Enable or disable compilation
    pub fn with_compilation(mut self, allow_compilation: bool) -> Self {
        self.allow_compilation = allow_compilation;
        self
    }

    /// Enable or disable strict mode
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the parse cache size
    pub fn with_max_cache_size(mut self, max_cache_size: usize) -> Self {
        self.max_cache_size = max_cache_size;
        self
    }

    /// Set the compiler settings
    pub fn with_compiler(mut self, compiler: CompilerConfig) -> Self {
        self.compiler = compiler;
        self
    }
}

/// Main formula engine
///
/// Owns the registries formulas are parsed with and a cache of parsed trees
/// keyed by formula text. All methods take `&self`; an engine can be shared
/// between threads.
pub struct FormulaEngine {
    operators: Arc<OperatorRegistry>,
    functions: Arc<FunctionRegistry>,
    config: EngineConfig,
    expression_cache: Mutex<FxHashMap<String, Arc<Expression>>>,
}

impl Default for FormulaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FormulaEngine {
    /// Create an engine with the standard registries and default configuration
    pub fn new() -> Self {
        Self {
            operators: OperatorRegistry::standard(),
            functions: FunctionRegistry::standard(),
            config: EngineConfig::default(),
            expression_cache: Mutex::new(FxHashMap::default()),
        }
    }

    /// Use a different native function table
    pub fn with_functions(mut self, functions: impl Into<Arc<FunctionRegistry>>) -> Self {
        self.functions = functions.into();
        self.expression_cache.get_mut().clear();
        self
    }

    /// Use a different operator table
    pub fn with_operators(mut self, operators: impl Into<Arc<OperatorRegistry>>) -> Self {
        self.operators = operators.into();
        self.expression_cache.get_mut().clear();
        self
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self.expression_cache.get_mut().clear();
        self
    }

    /// Current configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Native function table in use
    pub fn functions(&self) -> &Arc<FunctionRegistry> {
        &self.functions
    }

    /// Operator table in use
    pub fn operators(&self) -> &Arc<OperatorRegistry> {
        &self.operators
    }

    /// Parse a formula, compiling it when the configuration allows
    ///
    /// In strict mode a formula that cannot be compiled is rejected with
    /// [`FormulaError::Compilation`]; otherwise it falls back to tree walking.
    pub fn parse(&self, text: &str) -> Result<Expression> {
        let expression = parse_with(text, &self.operators, &self.functions)?;
        if self.config.allow_compilation {
            if self.config.strict {
                expression.try_compile(&self.config.compiler)?;
            } else {
                expression.compile_with(&self.config.compiler);
            }
        }
        Ok(expression)
    }

    /// Parse a formula, reusing the tree from an earlier call with the same text
    pub fn parse_cached(&self, text: &str) -> Result<Arc<Expression>> {
        if let Some(expression) = self.expression_cache.lock().get(text) {
            return Ok(Arc::clone(expression));
        }

        let expression = Arc::new(self.parse(text)?);
        let mut cache = self.expression_cache.lock();
        if cache.len() >= self.config.max_cache_size {
            log::debug!("formula cache full at {} entries, clearing", cache.len());
            cache.clear();
        }
        if self.config.max_cache_size > 0 {
            cache.insert(text.to_string(), Arc::clone(&expression));
        }
        Ok(expression)
    }

    /// Number of cached parsed formulas
    pub fn cache_len(&self) -> usize {
        self.expression_cache.lock().len()
    }

    /// Drop all cached parsed formulas
    pub fn clear_cache(&self) {
        self.expression_cache.lock().clear();
    }

    /// Evaluate a parsed formula to a plain value
    pub fn calc(&self, expression: &Expression, ctx: &dyn Context) -> Result<Value> {
        if !self.config.strict {
            return Ok(expression.calc(ctx, true));
        }
        match expression.calc_checked(ctx, true)? {
            Value::Unknown => Err(FormulaError::unknown_result(expression.to_string())),
            value => Ok(value),
        }
    }

    /// Parse (through the cache) and evaluate a formula
    pub fn evaluate(&self, text: &str, ctx: &dyn Context) -> Result<Value> {
        let expression = self.parse_cached(text)?;
        self.calc(&expression, ctx)
    }
}

impl fmt::Debug for FormulaEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormulaEngine")
            .field("operators", &self.operators.len())
            .field("functions", &self.functions)
            .field("config", &self.config)
            .field("cached", &self.cache_len())
            .finish()
    }
}

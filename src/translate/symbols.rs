//! Scoped symbol table.
//!
//! Symbols live in an arena and are referred to by [`SymbolId`]. Scopes only
//! map names to ids, so a symbol keeps its use count after its scope closes.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use super::ast::SymbolId;
use super::error::{Result, TranslateError};
use super::span::Position;

/// Statically known type of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Integer,
    Float,
    Str,
    Bool,
    Nil,
    Array,
    Unknown,
}

impl ValueType {
    /// Combine two observed types for the same name.
    pub fn merge(self, other: Self) -> Self {
        if self == other {
            self
        } else {
            Self::Unknown
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Str => "string",
            Self::Bool => "boolean",
            Self::Nil => "nil",
            Self::Array => "array",
            Self::Unknown => "value of unknown type",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Variable { ty: ValueType },
    Function { arity: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Number of live references.
    pub uses: usize,
    pub declared_at: Position,
}

#[derive(Debug, Default)]
struct Scope {
    variables: HashMap<String, SymbolId>,
    functions: HashMap<String, SymbolId>,
}

/// Symbols plus the stack of scopes currently open.
#[derive(Debug)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    scopes: Vec<Scope>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Create a table with only the global scope open.
    pub fn new() -> Self {
        Self {
            symbols: Vec::new(),
            scopes: vec![Scope::default()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Close the innermost scope. The global scope stays open.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    fn add(&mut self, name: &str, kind: SymbolKind, at: Position) -> SymbolId {
        let id = self.symbols.len();
        self.symbols.push(Symbol {
            name: name.to_string(),
            kind,
            uses: 0,
            declared_at: at,
        });
        id
    }

    fn current(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    /// Declare a variable, or reuse the visible one with the same name.
    pub fn declare_variable(&mut self, name: &str, ty: ValueType, at: Position) -> SymbolId {
        if let Some(id) = self.lookup_variable(name) {
            self.set_type(id, ty);
            return id;
        }
        let id = self.add(name, SymbolKind::Variable { ty }, at);
        self.current().variables.insert(name.to_string(), id);
        id
    }

    /// Declare a parameter in the current scope, shadowing any outer name.
    pub fn declare_param(&mut self, name: &str, at: Position) -> SymbolId {
        let id = self.add(
            name,
            SymbolKind::Variable {
                ty: ValueType::Unknown,
            },
            at,
        );
        self.current().variables.insert(name.to_string(), id);
        id
    }

    /// Declare a function in the current scope.
    pub fn declare_function(&mut self, name: &str, arity: usize, at: Position) -> Result<SymbolId> {
        if self.current().functions.contains_key(name) {
            return Err(TranslateError::semantic(
                at,
                format!("function `{}` is already defined", name),
            ));
        }
        let id = self.add(name, SymbolKind::Function { arity }, at);
        self.current().functions.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn lookup_variable(&self, name: &str) -> Option<SymbolId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.variables.get(name).copied())
    }

    pub fn lookup_function(&self, name: &str) -> Option<SymbolId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.functions.get(name).copied())
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    /// Type of a variable symbol.
    pub fn type_of(&self, id: SymbolId) -> ValueType {
        match self.get(id).map(|s| &s.kind) {
            Some(SymbolKind::Variable { ty }) => *ty,
            _ => ValueType::Unknown,
        }
    }

    /// Record a reference.
    pub fn touch(&mut self, id: SymbolId) {
        if let Some(symbol) = self.symbols.get_mut(id) {
            symbol.uses += 1;
        }
    }

    /// Drop a reference that was removed from the tree.
    pub fn release(&mut self, id: SymbolId) {
        if let Some(symbol) = self.symbols.get_mut(id) {
            symbol.uses = symbol.uses.saturating_sub(1);
        }
    }

    pub fn uses(&self, id: SymbolId) -> usize {
        self.get(id).map(|s| s.uses).unwrap_or(0)
    }

    /// Merge a newly observed type into a variable.
    pub fn set_type(&mut self, id: SymbolId, ty: ValueType) {
        if let Some(Symbol {
            kind: SymbolKind::Variable { ty: current },
            ..
        }) = self.symbols.get_mut(id)
        {
            *current = current.merge(ty);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at() -> Position {
        Position::start()
    }

    #[test]
    fn redeclaring_reuses_symbol_and_merges_type() {
        let mut table = SymbolTable::new();
        let a = table.declare_variable("a", ValueType::Integer, at());
        let again = table.declare_variable("a", ValueType::Integer, at());
        assert_eq!(a, again);
        assert_eq!(table.type_of(a), ValueType::Integer);

        table.declare_variable("a", ValueType::Str, at());
        assert_eq!(table.type_of(a), ValueType::Unknown);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn inner_scope_sees_outer_variables() {
        let mut table = SymbolTable::new();
        let x = table.declare_variable("x", ValueType::Integer, at());
        table.push_scope();
        assert_eq!(table.lookup_variable("x"), Some(x));
        let y = table.declare_variable("y", ValueType::Integer, at());
        table.pop_scope();
        assert_eq!(table.lookup_variable("y"), None);
        assert!(table.get(y).is_some());
    }

    #[test]
    fn params_shadow_outer_names() {
        let mut table = SymbolTable::new();
        let outer = table.declare_variable("n", ValueType::Str, at());
        table.push_scope();
        let param = table.declare_param("n", at());
        assert_ne!(outer, param);
        assert_eq!(table.lookup_variable("n"), Some(param));
        table.pop_scope();
        assert_eq!(table.lookup_variable("n"), Some(outer));
    }

    #[test]
    fn duplicate_function_in_same_scope_is_rejected() {
        let mut table = SymbolTable::new();
        table.declare_function("f", 1, at()).unwrap();
        let err = table.declare_function("f", 2, at()).unwrap_err();
        assert!(err.message.contains("already defined"));

        table.push_scope();
        assert!(table.declare_function("f", 0, at()).is_ok());
    }

    #[test]
    fn global_scope_is_never_popped() {
        let mut table = SymbolTable::new();
        table.pop_scope();
        table.pop_scope();
        assert_eq!(table.depth(), 1);
    }

    #[test]
    fn release_saturates_at_zero() {
        let mut table = SymbolTable::new();
        let a = table.declare_variable("a", ValueType::Nil, at());
        table.touch(a);
        table.release(a);
        table.release(a);
        assert_eq!(table.uses(a), 0);
    }
}

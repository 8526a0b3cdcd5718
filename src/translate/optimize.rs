//! Dead code removal.
//!
//! Folding and unary collapsing happen while parsing. This pass removes
//! assignments to variables nobody reads and functions nobody calls. Blocks
//! are walked in reverse so that removing a statement releases the
//! references it held before earlier statements are judged. The pass
//! repeats until nothing changes.

use super::ast::{tidy_blank_lines, Block, Program, Stmt, StmtKind, Target};
use super::symbols::SymbolTable;

/// Remove unused assignments and functions from `program`.
///
/// Returns how many statements were removed.
pub fn optimize(program: &mut Program, symbols: &mut SymbolTable) -> usize {
    let mut total = 0;
    loop {
        let removed = prune_block(&mut program.body, symbols);
        if removed == 0 {
            break;
        }
        total += removed;
    }
    tracing::debug!("Optimizer removed {} statements", total);
    total
}

fn prune_block(block: &mut Block, symbols: &mut SymbolTable) -> usize {
    let mut removed = 0;
    let mut keep = vec![true; block.len()];

    for (i, stmt) in block.iter_mut().enumerate().rev() {
        if is_dead(stmt, symbols) {
            stmt.for_each_symbol(&mut |id| symbols.release(id));
            keep[i] = false;
            removed += 1;
        } else {
            removed += prune_nested(stmt, symbols);
        }
    }

    if removed > 0 {
        let mut flags = keep.into_iter();
        block.retain(|_| flags.next().unwrap_or(true));
        tidy_blank_lines(block);
    }
    removed
}

fn prune_nested(stmt: &mut Stmt, symbols: &mut SymbolTable) -> usize {
    match &mut stmt.kind {
        StmtKind::If {
            branches,
            otherwise,
        } => {
            let mut removed = 0;
            if let Some(body) = otherwise {
                removed += prune_block(body, symbols);
            }
            for branch in branches.iter_mut().rev() {
                removed += prune_block(&mut branch.body, symbols);
            }
            removed
        }
        StmtKind::While { body, .. }
        | StmtKind::Until { body, .. }
        | StmtKind::For { body, .. }
        | StmtKind::Def { body, .. } => prune_block(body, symbols),
        _ => 0,
    }
}

fn is_dead(stmt: &Stmt, symbols: &SymbolTable) -> bool {
    match &stmt.kind {
        StmtKind::Assign {
            target: Target::Var { symbol, .. },
            value,
        } => symbols.uses(*symbol) == 0 && !value.contains_call(),
        StmtKind::Def { symbol, .. } => symbols.uses(*symbol) == 0,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::lexer::tokenize;
    use crate::translate::parser::parse;

    fn optimized(source: &str) -> (Program, usize) {
        let (mut program, mut symbols) = parse(tokenize(source).unwrap(), true).unwrap();
        let removed = optimize(&mut program, &mut symbols);
        (program, removed)
    }

    fn kinds(program: &Program) -> Vec<&'static str> {
        program
            .body
            .iter()
            .map(|stmt| match stmt.kind {
                StmtKind::Blank => "blank",
                StmtKind::Comment(_) => "comment",
                StmtKind::Assign { .. } => "assign",
                StmtKind::Expr(_) => "expr",
                StmtKind::If { .. } => "if",
                StmtKind::While { .. } => "while",
                StmtKind::Until { .. } => "until",
                StmtKind::For { .. } => "for",
                StmtKind::Def { .. } => "def",
                StmtKind::Return(_) => "return",
                StmtKind::Next => "next",
                StmtKind::Break => "break",
            })
            .collect()
    }

    #[test]
    fn unused_variables_and_functions_cascade() {
        let source = "
            a = 10
            b = 20
            def foo()
              return a
            end
            c = a + b
            puts(a)
        ";
        let (program, removed) = optimized(source);
        assert_eq!(removed, 3);
        assert_eq!(kinds(&program), vec!["assign", "expr"]);
    }

    #[test]
    fn assignments_with_calls_are_kept() {
        let (program, removed) = optimized("name = readline(\"Name: \")\n");
        assert_eq!(removed, 0);
        assert_eq!(kinds(&program), vec!["assign"]);
    }

    #[test]
    fn called_functions_are_kept() {
        let (program, _) = optimized("def greet()\n  puts(\"hi\")\nend\ngreet()\n");
        assert_eq!(kinds(&program), vec!["def", "expr"]);
    }

    #[test]
    fn loop_bodies_are_pruned_to_a_fixed_point() {
        let source = "a = 0\nx = 0\nwhile x < 3\n  b = a\n  a = 1\n  x += 1\nend\n";
        let (program, removed) = optimized(source);
        assert_eq!(removed, 3);
        assert_eq!(kinds(&program), vec!["assign", "while"]);
        match &program.body[1].kind {
            StmtKind::While { body, .. } => assert_eq!(body.len(), 1),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn blank_lines_left_behind_are_tidied() {
        let source = "a = 1\n\nunused = 2\n\nputs(a)\n";
        let (program, _) = optimized(source);
        assert_eq!(kinds(&program), vec!["assign", "blank", "expr"]);
    }

    #[test]
    fn indexed_assignments_keep_their_array() {
        let (program, removed) = optimized("a = [1, 2]\na[0] = 5\n");
        assert_eq!(removed, 0);
        assert_eq!(kinds(&program), vec!["assign", "assign"]);
    }
}

use crate::error::{Diagnostic, Error};
use crate::eval::check::Checked;
use crate::eval::global::Global;
use itertools::Itertools;
use std::collections::{HashMap, HashSet};

/// Call graph: function id to the ids it calls
pub fn dependency(checked: &Checked) -> HashMap<usize, Vec<usize>> {
    checked
        .funcs
        .iter()
        .map(|(&id, func)| (id, func.calls.iter().copied().collect()))
        .collect()
}

/// Functions reachable from the entry expressions
pub fn filter(deps: &HashMap<usize, Vec<usize>>, entry: &[usize]) -> HashSet<usize> {
    let mut used = HashSet::new();
    let mut worklist = Vec::new();

    for &id in entry {
        if used.insert(id) {
            worklist.push(id);
        }
    }

    while let Some(id) = worklist.pop() {
        if let Some(dependencies) = deps.get(&id) {
            for &dep in dependencies {
                if used.insert(dep) {
                    worklist.push(dep);
                }
            }
        }
    }

    used
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Visiting,
    Done,
}

/// Order every function so that callees come before their callers.
/// Frames are static, so a call cycle is rejected.
pub fn order(global: &Global, deps: &HashMap<usize, Vec<usize>>) -> Result<Vec<usize>, Vec<Diagnostic>> {
    let mut walker = Walker {
        global,
        deps,
        marks: HashMap::new(),
        path: Vec::new(),
        order: Vec::new(),
        errors: Vec::new(),
    };
    for id in 0..global.funcs().len() {
        walker.visit(id);
    }
    match walker.errors.is_empty() {
        true => Ok(walker.order),
        false => Err(walker.errors),
    }
}

struct Walker<'a> {
    global: &'a Global,
    deps: &'a HashMap<usize, Vec<usize>>,
    marks: HashMap<usize, Mark>,
    path: Vec<usize>,
    order: Vec<usize>,
    errors: Vec<Diagnostic>,
}

impl<'a> Walker<'a> {
    fn visit(&mut self, id: usize) {
        match self.marks.get(&id) {
            Some(Mark::Done) => return,
            Some(Mark::Visiting) => {
                let start = self.path.iter().position(|&f| f == id).unwrap_or(0);
                let cycle = self.path[start..]
                    .iter()
                    .chain([&id])
                    .map(|&f| self.global.func(f).to_string())
                    .join(" -> ");
                let pos = self.global.func(id).pos;
                self.errors.push(Diagnostic::error(pos, Error::RecursiveCall(cycle)));
                return;
            }
            None => {}
        }

        self.marks.insert(id, Mark::Visiting);
        self.path.push(id);
        let callees = self.deps.get(&id).cloned().unwrap_or_default();
        for callee in callees {
            self.visit(callee);
        }
        self.path.pop();
        self.marks.insert(id, Mark::Done);
        self.order.push(id);
    }
}

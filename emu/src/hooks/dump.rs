use arch::{Inst, State};
use color_print::cprintln;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;

use super::Hook;

/// Prints variables named in the compiler's symbol map
#[derive(Debug)]
pub struct Dump {
    file: Option<String>,
    all: bool,
    map: Map,
}

#[derive(Debug, Default, Deserialize)]
struct Map {
    frames: BTreeMap<String, Frame>,
}

#[derive(Debug, Deserialize)]
struct Frame {
    addr: usize,
    size: usize,
    #[serde(default)]
    ret: Option<usize>,
    vars: Vec<Var>,
}

#[derive(Debug, Deserialize)]
struct Var {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    addr: usize,
    size: usize,
}

impl Dump {
    pub fn arg(file: Option<String>, all: bool) -> Result<Self, String> {
        let map = match &file {
            Some(fname) => {
                let reader = File::open(fname).map_err(|e| format!("{}: {}", fname, e))?;
                serde_yaml::from_reader(BufReader::new(reader))
                    .map_err(|e| format!("{}: {}", fname, e))?
            }
            None => Map::default(),
        };
        Ok(Self { file, all, map })
    }
}

impl Hook for Dump {
    fn init(&mut self, state: State) -> State {
        if self.all {
            println!(" * Dump all");
        }
        if let Some(fname) = &self.file {
            println!(" * Dump[{}] {:?}", self.map.frames.len(), fname);
        }
        state
    }

    fn exec(&mut self, time: u64, pc: usize, inst: Inst, state: State) -> State {
        if self.all {
            cprintln!(
                " {:>8} | pc {:>6} | {} | ptr {:>5} = {:>3}",
                time,
                pc,
                inst.cformat(),
                state.ptr(),
                state.get(state.ptr())
            );
        }
        state
    }

    fn fini(&mut self, state: &State) {
        if self.file.is_some() {
            self.print_frames(state);
        }
    }
}

impl Dump {
    fn print_frames(&self, state: &State) {
        println!(" +---------------------------------------------+");
        for (name, frame) in &self.map.frames {
            cprintln!(
                " | <green>{}</green> @ {} ({} cells)",
                name,
                frame.addr,
                frame.size
            );
            for var in &frame.vars {
                let cells: Vec<String> = (var.addr..var.addr + var.size)
                    .map(|addr| state.get(addr).to_string())
                    .collect();
                cprintln!(
                    " |   {:>5} : <m>{}</m> {} = {}",
                    var.addr,
                    var.ty,
                    var.name,
                    cells.join(" ")
                );
            }
            if let Some(ret) = frame.ret {
                cprintln!(" |   {:>5} : <y>return</y> = {}", ret, state.get(ret));
            }
        }
        println!(" +---------------------------------------------+");
    }
}

use std::io::Write;

use arch::{Inst, State};
use color_print::cprintln;

use super::Hook;

/// Feeds `,` from a file and echoes `.` to the console
pub struct Serial {
    style: bool,
    read_buf: Vec<u8>,
    write_buf: Option<Box<dyn Write>>,
}

impl Serial {
    pub fn arg(
        style: bool,
        write_file: Option<String>,
        read_file: Option<String>,
    ) -> Result<Serial, std::io::Error> {
        let read_buf = match read_file {
            Some(file) => std::fs::read(file)?,
            None => vec![],
        };

        let write_buf = match write_file {
            Some(file) => {
                let file = std::fs::File::create(file)?;
                Some(Box::new(std::io::BufWriter::new(file)) as Box<dyn Write>)
            }
            None => None,
        };

        Ok(Serial {
            style,
            read_buf,
            write_buf,
        })
    }
}

impl Hook for Serial {
    fn init(&mut self, mut state: State) -> State {
        state.feed(&self.read_buf);
        println!(" * Serial: {} input bytes", self.read_buf.len());
        state
    }

    fn exec(&mut self, _time: u64, _pc: usize, inst: Inst, mut state: State) -> State {
        if inst != Inst::Write {
            return state;
        }
        for byte in state.take_output() {
            match self.style {
                true => cprintln!(" > <r,s>{}</> ({})", byte as char, byte),
                false => print!("{}", byte as char),
            }
            if let Some(buf) = self.write_buf.as_mut() {
                if let Err(e) = buf.write_all(&[byte]) {
                    cprintln!("<red,bold>error</>: {}", e);
                }
            }
        }
        state
    }

    fn fini(&mut self, _state: &State) {
        if let Some(buf) = self.write_buf.as_mut() {
            if let Err(e) = buf.flush() {
                cprintln!("<red,bold>error</>: {}", e);
            }
        }
    }
}

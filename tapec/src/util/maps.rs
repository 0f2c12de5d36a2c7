use crate::compile::Frame;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Tape layout written next to the program for the emulator's dump hook
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SymbolMap {
    pub frames: IndexMap<String, FrameEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FrameEntry {
    pub addr: usize,
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ret: Option<usize>,
    pub vars: Vec<VarEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VarEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub addr: usize,
    pub size: usize,
}

impl SymbolMap {
    pub fn generate<'a>(frames: impl Iterator<Item = &'a Frame>) -> Self {
        let frames = frames
            .map(|frame| {
                let vars = frame
                    .layout
                    .vars
                    .iter()
                    .map(|var| VarEntry {
                        name: var.name.clone(),
                        ty: var.ty.to_string(),
                        addr: frame.base + var.offset,
                        size: var.ty.sizeof(),
                    })
                    .collect();
                let entry = FrameEntry {
                    addr: frame.base,
                    size: frame.size,
                    ret: (frame.ret_size > 0).then_some(frame.ret),
                    vars,
                };
                (frame.name.clone(), entry)
            })
            .collect();
        SymbolMap { frames }
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Frame and variable covering a tape cell
    pub fn owner(&self, addr: usize) -> Option<(&str, Option<&VarEntry>)> {
        self.frames
            .iter()
            .find(|(_, frame)| (frame.addr..frame.addr + frame.size).contains(&addr))
            .map(|(name, frame)| {
                let var = frame
                    .vars
                    .iter()
                    .find(|var| (var.addr..var.addr + var.size).contains(&addr));
                (name.as_str(), var)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: &str = r#"
frames:
  add(u8, u8):
    addr: 0
    size: 6
    ret: 2
    vars:
    - name: a
      type: u8
      addr: 0
      size: 1
    - name: b
      type: u8
      addr: 1
      size: 1
  "<entry>":
    addr: 6
    size: 3
    vars:
    - name: x
      type: u8
      addr: 6
      size: 1
"#;

    #[test]
    fn load_yaml() {
        let map = SymbolMap::from_yaml(MAP).unwrap();
        assert_eq!(map.frames.len(), 2);
        assert_eq!(map.frames["add(u8, u8)"].ret, Some(2));
        assert_eq!(map.frames["<entry>"].ret, None);
        assert_eq!(map.frames["<entry>"].vars[0].ty, "u8");
    }

    #[test]
    fn owner_of_cell() {
        let map = SymbolMap::from_yaml(MAP).unwrap();
        let (frame, var) = map.owner(1).unwrap();
        assert_eq!(frame, "add(u8, u8)");
        assert_eq!(var.unwrap().name, "b");
        let (frame, var) = map.owner(8).unwrap();
        assert_eq!(frame, "<entry>");
        assert!(var.is_none());
        assert!(map.owner(9).is_none());
    }

    #[test]
    fn yaml_keeps_order() {
        let map = SymbolMap::from_yaml(MAP).unwrap();
        let text = map.to_yaml().unwrap();
        let again = SymbolMap::from_yaml(&text).unwrap();
        let names: Vec<_> = again.frames.keys().collect();
        assert_eq!(names, ["add(u8, u8)", "<entry>"]);
    }
}

//! XML reader for [`SpecTree`].

use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Result, TreeError};
use crate::tree::{NodeId, SpecTree};

impl SpecTree {
    /// Parse an XML registry document.
    ///
    /// Elements and attributes become nodes; character data is trimmed and
    /// appended to the enclosing element. Comments, processing instructions
    /// and the XML declaration are ignored.
    pub fn parse(input: &str) -> Result<Self> {
        let mut reader = Reader::from_str(input);
        reader.config_mut().trim_text(true);

        let mut tree = SpecTree::new();
        let mut open = vec![NodeId::DOCUMENT];

        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    let parent = current(&open);
                    let id = append_start(&mut tree, parent, &start)?;
                    open.push(id);
                }
                Event::Empty(start) => {
                    let parent = current(&open);
                    append_start(&mut tree, parent, &start)?;
                }
                Event::End(end) => {
                    if open.len() <= 1 {
                        return Err(TreeError::Unbalanced {
                            detail: format!(
                                "unexpected </{}>",
                                String::from_utf8_lossy(end.name().as_ref())
                            ),
                        });
                    }
                    open.pop();
                }
                Event::Text(text) => {
                    let text = text.unescape()?;
                    tree.append_text(current(&open), &text);
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    tree.append_text(current(&open), &text);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if open.len() > 1 {
            return Err(TreeError::Unbalanced {
                detail: format!("unclosed <{}>", tree.data_tag(current(&open))),
            });
        }
        if tree.is_empty() {
            return Err(TreeError::Empty);
        }
        Ok(tree)
    }

    /// Read and parse an XML registry document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let input = fs::read_to_string(path).map_err(|source| TreeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&input)
    }
}

fn current(open: &[NodeId]) -> NodeId {
    open.last().copied().unwrap_or(NodeId::DOCUMENT)
}

fn append_start(tree: &mut SpecTree, parent: NodeId, start: &BytesStart<'_>) -> Result<NodeId> {
    let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }
    Ok(tree.append(parent, tag, attributes))
}

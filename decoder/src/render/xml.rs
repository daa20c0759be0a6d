//! XML document rendering
//!
//! Every element for a primitive read carries `offset`, `size` and `bytes`
//! attributes taken from its chunk, with the decoded value as text.

use std::fmt::{Display, Write};
use chrono::DateTime;
use crate::bytecode::Disassembly;
use crate::marshal::{Chunk, CodeObject, Header, Node, Object, SizedBytes, Version};
use crate::module::PycModule;
use crate::render::bytes_literal;

const INDENT: &str = "  ";

#[derive(Debug, Default)]
struct Element {
    name: &'static str,
    attributes: Vec<(&'static str, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    fn attr(mut self, key: &'static str, value: impl Display) -> Self {
        self.attributes.push((key, value.to_string()));
        self
    }

    fn text(mut self, text: impl Display) -> Self {
        self.text = Some(text.to_string());
        self
    }

    fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    fn write(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push_str(INDENT);
        }
        out.push('<');
        out.push_str(self.name);
        for (key, value) in &self.attributes {
            let _ = write!(out, " {}=\"{}\"", key, escape(value, true));
        }

        match (&self.text, self.children.is_empty()) {
            (None, true) => out.push_str("/>\n"),
            (Some(text), true) => {
                let _ = writeln!(out, ">{}</{}>", escape(text, false), self.name);
            }
            (text, false) => {
                out.push('>');
                if let Some(text) = text {
                    out.push_str(&escape(text, false));
                }
                out.push('\n');
                for child in &self.children {
                    child.write(out, depth + 1);
                }
                for _ in 0..depth {
                    out.push_str(INDENT);
                }
                let _ = writeln!(out, "</{}>", self.name);
            }
        }
    }
}

fn escape(raw: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render a decoded module as an indented XML document
pub fn render(module: &PycModule) -> String {
    let root = Element::new("dump")
        .attr("filename", &module.source)
        .attr("version", module.version)
        .child(header_element(&module.header, module.version))
        .child(Element::new("body").child(node_element(&module.body)));

    let mut out = String::new();
    root.write(&mut out, 0);
    out
}

/// Element for a primitive read whose value renders as itself
fn chunk_element<T: Display>(name: &'static str, chunk: &Chunk<T>) -> Element {
    chunk_with_text(name, chunk, &chunk.value)
}

fn chunk_with_text<T>(name: &'static str, chunk: &Chunk<T>, text: impl Display) -> Element {
    Element::new(name)
        .attr("offset", chunk.offset)
        .attr("size", chunk.size())
        .attr("bytes", bytes_literal(&chunk.bytes))
        .text(text)
}

fn header_element(header: &Header, version: Version) -> Element {
    let time_stamp = DateTime::from_timestamp(i64::from(header.time_stamp.value), 0)
        .map(|date| date.naive_utc().format("%Y-%m-%dT%H:%M:%S").to_string())
        .unwrap_or_else(|| header.time_stamp.value.to_string());

    let mut element = Element::new("header")
        .child(chunk_with_text("magic_number", &header.magic_number, version))
        .child(chunk_with_text("time_stamp", &header.time_stamp, time_stamp));
    if let Some(size) = &header.size {
        element = element.child(chunk_element("size", size));
    }
    element
}

fn node_element(node: &Node) -> Element {
    let name = match &node.object {
        Object::None => "none",
        Object::SmallTuple(_) => "small-tuple",
        Object::ShortAscii(_) => "short-ascii",
        Object::ShortAsciiInterned(_) => "short-ascii-interned",
        Object::String(_) => "string",
        Object::Reference(_) => "reference",
        Object::Code(_) => "code",
    };

    let mut element = Element::new(name)
        .attr("offset", node.tag.offset)
        .attr("tag", node.kind().as_char());
    if node.flagged() {
        element = element.attr("flagged", true);
    }

    match &node.object {
        Object::None => element,
        Object::SmallTuple(tuple) => {
            let mut items = Element::new("items");
            for item in &tuple.items {
                items = items.child(Element::new("item").child(node_element(item)));
            }
            element.child(chunk_element("size", &tuple.size)).child(items)
        }
        Object::ShortAscii(s) | Object::ShortAsciiInterned(s) => sized_bytes(element, s),
        Object::String(s) => sized_bytes(element, s),
        Object::Reference(index) => element.child(chunk_element("index", index)),
        Object::Code(code) => code_children(element, code),
    }
}

fn sized_bytes<L: Display>(element: Element, s: &SizedBytes<L>) -> Element {
    element
        .child(chunk_element("size", &s.size))
        .child(chunk_with_text("value", &s.value, bytes_literal(&s.value.value)))
}

// Nested code objects recurse through here, so the flat fields are built in
// `code_prefix` to keep this frame small.
fn code_children(element: Element, code: &CodeObject) -> Element {
    let mut element = code_prefix(element, code);
    for (name, table) in code.tables() {
        element = element.child(Element::new(name).child(node_element(table)));
    }
    element
        .child(chunk_element("firstline", &code.first_line))
        .child(Element::new("table").child(node_element(&code.line_table)))
}

fn code_prefix(mut element: Element, code: &CodeObject) -> Element {
    for (name, field) in code.integer_fields() {
        element = element.child(chunk_element(name, field));
    }

    let mut payload = Element::new("code").child(Element::new("original").child(node_element(&code.code)));
    if let Some(bytes) = code.code_bytes() {
        payload = payload.child(Element::new("array").text(format!("{:?}", bytes)));
    }
    if let Some(disassembly) = &code.disassembly {
        payload = payload.child(bytecodes_element(disassembly));
    }
    element.child(payload)
}

fn bytecodes_element(disassembly: &Disassembly) -> Element {
    let mut element = Element::new("bytecodes");
    if let Some(offset) = disassembly.truncated_at {
        element = element.attr("truncated", offset);
    }

    disassembly.instructions.iter().fold(element, |element, instruction| {
        let mut bytecode = Element::new("bytecode")
            .attr("byte", format!("{:03}", instruction.offset))
            .attr("code", &instruction.mnemonic)
            .attr("opcode", instruction.opcode);
        if let Some(operand) = instruction.operand {
            bytecode = bytecode.attr("operand", operand);
        }
        if let Some(argument) = instruction.argument {
            bytecode = bytecode.attr("arguments", argument);
        }
        element.child(bytecode)
    })
}

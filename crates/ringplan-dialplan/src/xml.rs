//! Dialplan XML tree and writer.
//!
//! The tree is built completely in memory and then written with
//! `quick-xml`'s writer API using two-space indentation and no XML
//! declaration, which is the form the switch stores in its dialplan table.

use std::{borrow::Cow, io::Cursor};

use quick_xml::{
  Writer,
  events::{BytesEnd, BytesStart, Event, attributes::Attribute},
  name::QName,
};
use uuid::Uuid;

use crate::error::{Error, Result};

// ─── Tree ────────────────────────────────────────────────────────────────────

/// The `data` attribute of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionData {
  /// No `data` attribute at all.
  None,
  /// Escaped normally.
  Text(String),
  /// Only `&` and `"` are escaped; `<` and `>` stay literal. Used for
  /// bridge commands, whose leading `<...>` channel-variable block must
  /// reach the switch unescaped.
  Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
  pub application: String,
  pub data:        ActionData,
  /// Evaluate immediately so later conditions in the same pass can see the
  /// variable.
  pub inline:      bool,
}

impl Action {
  pub fn new(application: &str, data: impl Into<String>) -> Self {
    Action {
      application: application.to_owned(),
      data:        ActionData::Text(data.into()),
      inline:      false,
    }
  }

  /// `set key=value`
  pub fn set(key: &str, value: impl std::fmt::Display) -> Self {
    Action::new("set", format!("{key}={value}"))
  }

  /// `export key=value`
  pub fn export(key: &str, value: impl std::fmt::Display) -> Self {
    Action::new("export", format!("{key}={value}"))
  }

  /// An application with no `data` attribute.
  pub fn bare(application: &str) -> Self {
    Action {
      application: application.to_owned(),
      data:        ActionData::None,
      inline:      false,
    }
  }

  /// An application whose data keeps `<` and `>` literal.
  pub fn raw(application: &str, data: impl Into<String>) -> Self {
    Action {
      application: application.to_owned(),
      data:        ActionData::Raw(data.into()),
      inline:      false,
    }
  }

  pub fn inline(mut self) -> Self {
    self.inline = true;
    self
  }
}

/// A `<condition>` with its actions and, for conditions that may not match,
/// the anti-actions run instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
  pub field:        String,
  pub expression:   String,
  /// `break` attribute; `Some("never")` lets evaluation continue past a
  /// non-matching condition.
  pub break_on:     Option<&'static str>,
  pub actions:      Vec<Action>,
  pub anti_actions: Vec<Action>,
}

impl Condition {
  pub fn new(field: &str, expression: impl Into<String>) -> Self {
    Condition {
      field:        field.to_owned(),
      expression:   expression.into(),
      break_on:     None,
      actions:      Vec::new(),
      anti_actions: Vec::new(),
    }
  }

  pub fn with_break(mut self, break_on: &'static str) -> Self {
    self.break_on = Some(break_on);
    self
  }

  pub fn action(&mut self, action: Action) -> &mut Self {
    self.actions.push(action);
    self
  }

  pub fn anti_action(&mut self, action: Action) -> &mut Self {
    self.anti_actions.push(action);
    self
  }
}

/// The root `<extension>` element of a dialplan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialplanXml {
  pub name:        String,
  pub dp_continue: bool,
  pub uuid:        Uuid,
  pub conditions:  Vec<Condition>,
}

// ─── Writer ──────────────────────────────────────────────────────────────────

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn xml_err(e: impl std::fmt::Display) -> Error { Error::Xml(e.to_string()) }

impl DialplanXml {
  /// Serialize the tree.
  pub fn to_xml(&self) -> Result<String> {
    let mut w = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    let mut root = BytesStart::new("extension");
    root.push_attribute(("name", self.name.as_str()));
    root.push_attribute(("continue", bool_str(self.dp_continue)));
    root.push_attribute(("uuid", self.uuid.to_string().as_str()));
    w.write_event(Event::Start(root)).map_err(xml_err)?;

    for condition in &self.conditions {
      write_condition(&mut w, condition)?;
    }

    w.write_event(Event::End(BytesEnd::new("extension")))
      .map_err(xml_err)?;

    String::from_utf8(w.into_inner().into_inner()).map_err(xml_err)
  }
}

fn bool_str(b: bool) -> &'static str { if b { "true" } else { "false" } }

fn write_condition(w: &mut XmlWriter, condition: &Condition) -> Result<()> {
  let mut el = BytesStart::new("condition");
  el.push_attribute(("field", condition.field.as_str()));
  el.push_attribute(("expression", condition.expression.as_str()));
  if let Some(break_on) = condition.break_on {
    el.push_attribute(("break", break_on));
  }

  if condition.actions.is_empty() && condition.anti_actions.is_empty() {
    return w.write_event(Event::Empty(el)).map_err(xml_err);
  }

  w.write_event(Event::Start(el)).map_err(xml_err)?;
  for action in &condition.actions {
    write_action(w, "action", action)?;
  }
  for action in &condition.anti_actions {
    write_action(w, "anti-action", action)?;
  }
  w.write_event(Event::End(BytesEnd::new("condition")))
    .map_err(xml_err)
}

/// Escape what would end or corrupt a double-quoted attribute value.
fn escape_raw(data: &str) -> Cow<'_, str> {
  if !data.contains(['&', '"']) {
    return Cow::Borrowed(data);
  }
  Cow::Owned(data.replace('&', "&amp;").replace('"', "&quot;"))
}

fn write_action(w: &mut XmlWriter, tag: &str, action: &Action) -> Result<()> {
  let mut el = BytesStart::new(tag);
  el.push_attribute(("application", action.application.as_str()));
  match &action.data {
    ActionData::None => {}
    ActionData::Text(data) => el.push_attribute(("data", data.as_str())),
    ActionData::Raw(data) => el.push_attribute(Attribute {
      key:   QName(b"data"),
      value: match escape_raw(data) {
        Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
        Cow::Owned(s) => Cow::Owned(s.into_bytes()),
      },
    }),
  }
  if action.inline {
    el.push_attribute(("inline", "true"));
  }
  w.write_event(Event::Empty(el)).map_err(xml_err)
}

//! Variable resolution
//!
//! Names resolve through the executing frame: with-blocks innermost first,
//! then the function scope chain, then the target movie and finally
//! `_global`. Names containing `:`, `.` or `/` are paths into the movie
//! tree.

use crate::error::VmError;
use crate::value::{AsString, CheapClone, ObjRef, Value};

use super::Context;

/// A variable reference split into the object path and the member name
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum VariablePath<'a> {
    /// Plain identifier
    Name,
    /// `path:name` or `path.name`
    Member { path: &'a str, name: &'a str },
    /// Slash path naming a movie, e.g. `/a/b` or `../c`
    Movie,
}

/// Classify a variable reference
pub(crate) fn split_path(name: &str) -> VariablePath<'_> {
    if let Some((path, member)) = name.rsplit_once(':') {
        return VariablePath::Member { path, name: member };
    }
    if name.contains('/') {
        return VariablePath::Movie;
    }
    match name.rsplit_once('.') {
        Some((path, member)) if !path.is_empty() && !member.is_empty() => {
            VariablePath::Member { path, name: member }
        }
        _ => VariablePath::Name,
    }
}

impl Context {
    /// Resolve names with a meaning of their own
    fn special_variable(&mut self, name: &AsString) -> Result<Option<Value>, VmError> {
        let case_sensitive = self.case_sensitive();
        let is = |candidate: &AsString| {
            name == candidate
                || (!case_sensitive && name.as_str().eq_ignore_ascii_case(candidate.as_str()))
        };
        let frame = self.frame()?;
        if is(&self.names.this) {
            return Ok(Some(Value::Object(frame.this_value())));
        }
        if is(&self.names.global) && self.version() > 5 {
            return Ok(Some(Value::Object(self.global())));
        }
        if is(&self.names.root) || is(&self.names.level0) {
            return Ok(Some(Value::Object(self.root_movie())));
        }
        if is(&self.names.parent) {
            return Ok(Some(
                self.movie_parent(&frame.target)
                    .map(Value::Object)
                    .unwrap_or_default(),
            ));
        }
        if is(&self.names.super_) {
            if let Some(super_ref) = &frame.super_ref {
                return Ok(Some(Value::Object(super_ref.cheap_clone())));
            }
        }
        Ok(None)
    }

    /// Objects searched for an unqualified name, in order
    fn lookup_chain(&self, include_global: bool) -> Result<Vec<ObjRef>, VmError> {
        let frame = self.frame()?;
        let mut chain = frame.scope_objects();
        if !chain.contains(&frame.target) {
            chain.push(frame.target.cheap_clone());
        }
        if include_global {
            chain.push(self.global());
        }
        Ok(chain)
    }

    /// Value of a variable reference; Undefined if it does not resolve
    pub(crate) fn get_variable(&mut self, name: &AsString) -> Result<Value, VmError> {
        match split_path(name.as_str()) {
            VariablePath::Member { path, name: member } => {
                let member = self.intern(member);
                let target = self.frame()?.target.cheap_clone();
                Ok(match self.eval_path(&target, path)? {
                    Some(obj) => self.get_member(&obj, &member).unwrap_or_default(),
                    None => Value::Undefined,
                })
            }
            VariablePath::Movie => {
                let target = self.frame()?.target.cheap_clone();
                Ok(self
                    .eval_path(&target, name.as_str())?
                    .map(Value::Object)
                    .unwrap_or_default())
            }
            VariablePath::Name => {
                if let Some(value) = self.special_variable(name)? {
                    return Ok(value);
                }
                for obj in self.lookup_chain(true)? {
                    if let Some(value) = self.get_member(&obj, name) {
                        return Ok(value);
                    }
                }
                tracing::trace!(name = name.as_str(), "variable not found");
                Ok(Value::Undefined)
            }
        }
    }

    /// Assign a variable. An unqualified name is written where it already
    /// exists, otherwise on the frame's variable object.
    pub(crate) fn set_variable(&mut self, name: &AsString, value: Value) -> Result<(), VmError> {
        match split_path(name.as_str()) {
            VariablePath::Member { path, name: member } => {
                let member = self.intern(member);
                let target = self.frame()?.target.cheap_clone();
                match self.eval_path(&target, path)? {
                    Some(obj) => self.set_member(&obj, &member, value),
                    None => tracing::warn!(path, "no object to assign {} on", member),
                }
                Ok(())
            }
            VariablePath::Movie => {
                tracing::warn!(name = name.as_str(), "cannot assign to a movie path");
                Ok(())
            }
            VariablePath::Name => {
                for obj in self.lookup_chain(false)? {
                    if self.has_member(&obj, name) {
                        self.set_member(&obj, name, value);
                        return Ok(());
                    }
                }
                let var_object = self.frame()?.var_object();
                self.set_member(&var_object, name, value);
                Ok(())
            }
        }
    }

    /// Define a local on the frame's variable object
    pub(crate) fn define_local(&mut self, name: &AsString, value: Value) -> Result<(), VmError> {
        let var_object = self.frame()?.var_object();
        self.set_member(&var_object, name, value);
        Ok(())
    }

    /// Delete the nearest definition of `name` in scope
    pub(crate) fn delete_variable(&mut self, name: &AsString) -> Result<bool, VmError> {
        for obj in self.lookup_chain(true)? {
            if self.find_owner(&obj, name).is_some_and(|owner| owner == obj) {
                return Ok(self.delete_member(&obj, name));
            }
        }
        Ok(false)
    }

    /// Resolve a movie path relative to `start`.
    ///
    /// Slash paths (`/a/b`, `../c`) walk movie children; dotted paths
    /// (`_root.a.b`, `obj.field`) resolve their first segment as a
    /// variable and then read members.
    pub fn eval_path(&mut self, start: &ObjRef, path: &str) -> Result<Option<ObjRef>, VmError> {
        let slashes = path.contains('/');
        let (mut current, rest) = match path.strip_prefix('/') {
            Some(rest) => (self.root_movie(), rest),
            None => (start.cheap_clone(), path),
        };
        let separator = if slashes { '/' } else { '.' };
        for (i, segment) in rest.split(separator).enumerate() {
            if segment.is_empty() {
                continue;
            }
            let next = match segment {
                ".." | "_parent" => self.movie_parent(&current),
                "_root" | "_level0" => Some(self.root_movie()),
                "this" => Some(current.cheap_clone()),
                _ => {
                    let key = self.intern(segment);
                    match self.get_member(&current, &key) {
                        Some(value) => value.as_object().cloned(),
                        // The head of a dotted path may name any variable
                        None if i == 0 && !slashes && self.frame().is_ok() => {
                            self.get_variable(&key)?.as_object().cloned()
                        }
                        None => None,
                    }
                }
            };
            match next {
                Some(obj) => current = obj,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }
}

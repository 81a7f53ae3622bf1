use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use super::{IdentitySource, SourceError};
use crate::{GroupId, GroupRecord, ROOT_USER, SourceRecords, UserId, UserRecord};

/// Reads the colon-separated `passwd` and `group` databases.
///
/// Supplementary members listed by name in `group` are resolved against the users
/// read in the same pass; names with no matching user are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
	passwd: PathBuf,
	group: PathBuf,
}

impl Default for FileSource {
	fn default() -> Self {
		Self::new("/etc/passwd", "/etc/group")
	}
}

impl FileSource {
	pub fn new(passwd: impl Into<PathBuf>, group: impl Into<PathBuf>) -> Self {
		Self {
			passwd: passwd.into(),
			group: group.into(),
		}
	}

	pub fn passwd_path(&self) -> &Path {
		&self.passwd
	}

	pub fn group_path(&self) -> &Path {
		&self.group
	}
}

impl IdentitySource for FileSource {
	fn read(&self) -> Result<SourceRecords, SourceError> {
		let passwd = read_file(&self.passwd)?;
		let group = read_file(&self.group)?;

		let users = parse_passwd(&self.passwd, &passwd)?;
		let by_name: FxHashMap<&str, UserId> = users.iter().map(|u| (u.name.as_str(), u.uid)).collect();

		let mut groups = Vec::new();
		let mut supplementary = Vec::new();
		for line in records(&group) {
			let (record, members) = parse_group_line(&self.group, line)?;
			let uids: Vec<UserId> = members.filter_map(|name| by_name.get(name).copied()).collect();
			if !uids.is_empty() {
				supplementary.push((record.gid, uids));
			}
			groups.push(record);
		}

		tracing::trace!(
			users = users.len(),
			groups = groups.len(),
			passwd = %self.passwd.display(),
			"ugid.source.file.read"
		);
		Ok(SourceRecords {
			users,
			groups,
			privileged: vec![ROOT_USER],
			supplementary,
		})
	}
}

fn read_file(path: &Path) -> Result<String, SourceError> {
	std::fs::read_to_string(path).map_err(|error| SourceError::Io {
		path: path.to_path_buf(),
		error,
	})
}

/// Non-blank, non-comment lines with their 1-based line numbers.
fn records(text: &str) -> impl Iterator<Item = (usize, &str)> {
	text.lines()
		.enumerate()
		.map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
		.filter(|(_, line)| {
			let trimmed = line.trim_start();
			!trimmed.is_empty() && !trimmed.starts_with('#')
		})
}

fn parse_passwd(path: &Path, text: &str) -> Result<Vec<UserRecord>, SourceError> {
	records(text)
		.map(|(line, content)| {
			let mut fields = content.split(':');
			let name = fields.next().unwrap_or_default();
			let _password = fields.next();
			let uid = parse_id(path, line, "uid", fields.next())?;
			let gid = parse_id(path, line, "gid", fields.next())?;
			Ok(UserRecord::new(uid, name, gid))
		})
		.collect()
}

fn parse_group_line<'a>(
	path: &Path,
	(line, content): (usize, &'a str),
) -> Result<(GroupRecord, impl Iterator<Item = &'a str>), SourceError> {
	let mut fields = content.splitn(4, ':');
	let name = fields.next().unwrap_or_default();
	let _password = fields.next();
	let gid: GroupId = parse_id(path, line, "gid", fields.next())?;
	let members = fields
		.next()
		.unwrap_or_default()
		.split(',')
		.map(str::trim)
		.filter(|m| !m.is_empty());
	Ok((GroupRecord::new(gid, name), members))
}

fn parse_id(path: &Path, line: usize, what: &str, field: Option<&str>) -> Result<u32, SourceError> {
	let malformed = |reason: String| SourceError::Malformed {
		path: path.to_path_buf(),
		line,
		reason,
	};
	let field = field.ok_or_else(|| malformed(format!("missing {what} field")))?;
	field
		.trim()
		.parse()
		.map_err(|_| malformed(format!("invalid {what} {field:?}")))
}

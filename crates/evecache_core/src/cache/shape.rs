/// Decoding and projection behaviour selected by an object's class name.
///
/// Classification is pure suffix matching, computed once per object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectShape {
	/// `*.RowList`: rows until a double marker.
	RowList,
	/// `*.CRowset`: rows until a double marker.
	CRowset,
	/// `*.RowDict`: single-marker short form or rows until a marker.
	RowDict,
	/// `*.CFilterRowset`: as `RowDict`.
	CFilterRowset,
	/// `*.CIndexedRowset`: as `RowDict`.
	CIndexedRowset,
	/// `*.KeyVal`: one payload member.
	KeyVal,
	/// `*.CachedObject`: one payload member.
	CachedObject,
	/// `*.CachedMethodCallResult`: one payload member.
	CachedMethodCallResult,
	/// `*.objectCaching.CachedObject`: one payload member plus a lazily decoded cached object.
	ObjectCachingCachedObject,
	/// `*.DBRowDescriptor`: column layout for compressed rows.
	DBRowDescriptor,
	/// Any other class.
	Plain,
}

const SUFFIXES: &[(&str, ObjectShape)] = &[
	// Longest first: this one also ends with ".CachedObject".
	(".objectCaching.CachedObject", ObjectShape::ObjectCachingCachedObject),
	(".CachedMethodCallResult", ObjectShape::CachedMethodCallResult),
	(".CachedObject", ObjectShape::CachedObject),
	(".DBRowDescriptor", ObjectShape::DBRowDescriptor),
	(".CIndexedRowset", ObjectShape::CIndexedRowset),
	(".CFilterRowset", ObjectShape::CFilterRowset),
	(".CRowset", ObjectShape::CRowset),
	(".RowList", ObjectShape::RowList),
	(".RowDict", ObjectShape::RowDict),
	(".KeyVal", ObjectShape::KeyVal),
];

impl ObjectShape {
	/// Classify a class name by suffix.
	pub fn classify(class_name: &str) -> Self {
		SUFFIXES
			.iter()
			.find(|(suffix, _)| class_name.ends_with(suffix))
			.map(|(_, shape)| *shape)
			.unwrap_or(Self::Plain)
	}

	/// Whether one extra node follows the header as payload.
	pub fn has_payload_member(self) -> bool {
		matches!(self, Self::KeyVal | Self::CachedObject | Self::CachedMethodCallResult | Self::ObjectCachingCachedObject)
	}

	/// Whether a cached-object wrapper follows the payload member.
	pub fn wraps_cached_object(self) -> bool {
		self == Self::ObjectCachingCachedObject
	}

	/// Rows terminated by two consecutive markers.
	pub fn is_row_list(self) -> bool {
		matches!(self, Self::RowList | Self::CRowset)
	}

	/// Rows in single-marker short form or marker-terminated list form.
	pub fn is_row_dict(self) -> bool {
		matches!(self, Self::RowDict | Self::CFilterRowset | Self::CIndexedRowset)
	}

	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::RowList => "row_list",
			Self::CRowset => "crowset",
			Self::RowDict => "row_dict",
			Self::CFilterRowset => "cfilter_rowset",
			Self::CIndexedRowset => "cindexed_rowset",
			Self::KeyVal => "keyval",
			Self::CachedObject => "cached_object",
			Self::CachedMethodCallResult => "cached_method_call_result",
			Self::ObjectCachingCachedObject => "object_caching_cached_object",
			Self::DBRowDescriptor => "dbrow_descriptor",
			Self::Plain => "plain",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::ObjectShape;

	#[test]
	fn suffixes_classify() {
		assert_eq!(ObjectShape::classify("dbutil.RowList"), ObjectShape::RowList);
		assert_eq!(ObjectShape::classify("dbutil.CRowset"), ObjectShape::CRowset);
		assert_eq!(ObjectShape::classify("dbutil.RowDict"), ObjectShape::RowDict);
		assert_eq!(ObjectShape::classify("dbutil.CFilterRowset"), ObjectShape::CFilterRowset);
		assert_eq!(ObjectShape::classify("dbutil.CIndexedRowset"), ObjectShape::CIndexedRowset);
		assert_eq!(ObjectShape::classify("util.KeyVal"), ObjectShape::KeyVal);
		assert_eq!(ObjectShape::classify("util.CachedObject"), ObjectShape::CachedObject);
		assert_eq!(ObjectShape::classify("objectCaching.CachedMethodCallResult"), ObjectShape::CachedMethodCallResult);
		assert_eq!(ObjectShape::classify("blue.DBRowDescriptor"), ObjectShape::DBRowDescriptor);
		assert_eq!(ObjectShape::classify("RowList"), ObjectShape::Plain, "suffix includes the dot");
	}

	#[test]
	fn object_caching_wins_over_plain_cached_object() {
		let shape = ObjectShape::classify("objectCaching.CachedObject");
		assert_eq!(shape, ObjectShape::CachedObject, "needs a leading module segment");
		assert!(!shape.wraps_cached_object());
		let shape = ObjectShape::classify("svc.objectCaching.CachedObject");
		assert_eq!(shape, ObjectShape::ObjectCachingCachedObject);
		assert!(shape.has_payload_member());
		assert!(shape.wraps_cached_object());
	}
}

use std::fmt::{Display, Formatter};

/// A Java release, identified by the class file major version it introduced.
///
/// Take a look at [the list of class file versions](https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.1-200-B.2).
/// Major versions not in this list are still read and written unchanged, they just have no [`Release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum Release {
	Java1_1 = 45,
	Java1_2 = 46,
	Java1_3 = 47,
	Java1_4 = 48,
	Java5 = 49,
	Java6 = 50,
	Java7 = 51,
	Java8 = 52,
	Java9 = 53,
	Java10 = 54,
	Java11 = 55,
	Java12 = 56,
	Java13 = 57,
	Java14 = 58,
	Java15 = 59,
	Java16 = 60,
	Java17 = 61,
	Java18 = 62,
	Java19 = 63,
	Java20 = 64,
	Java21 = 65,
	Java22 = 66,
	Java23 = 67,
}

impl Release {
	pub const fn from_major(major: u16) -> Option<Release> {
		let release = match major {
			45 => Release::Java1_1,
			46 => Release::Java1_2,
			47 => Release::Java1_3,
			48 => Release::Java1_4,
			49 => Release::Java5,
			50 => Release::Java6,
			51 => Release::Java7,
			52 => Release::Java8,
			53 => Release::Java9,
			54 => Release::Java10,
			55 => Release::Java11,
			56 => Release::Java12,
			57 => Release::Java13,
			58 => Release::Java14,
			59 => Release::Java15,
			60 => Release::Java16,
			61 => Release::Java17,
			62 => Release::Java18,
			63 => Release::Java19,
			64 => Release::Java20,
			65 => Release::Java21,
			66 => Release::Java22,
			67 => Release::Java23,
			_ => return None,
		};
		Some(release)
	}

	pub const fn major(self) -> u16 {
		self as u16
	}

	/// The common name of the release, like `"Java 1.4"` or `"Java 8"`.
	pub fn known_as(self) -> &'static str {
		match self {
			Release::Java1_1 => "Java 1.1",
			Release::Java1_2 => "Java 1.2",
			Release::Java1_3 => "Java 1.3",
			Release::Java1_4 => "Java 1.4",
			Release::Java5 => "Java 5",
			Release::Java6 => "Java 6",
			Release::Java7 => "Java 7",
			Release::Java8 => "Java 8",
			Release::Java9 => "Java 9",
			Release::Java10 => "Java 10",
			Release::Java11 => "Java 11",
			Release::Java12 => "Java 12",
			Release::Java13 => "Java 13",
			Release::Java14 => "Java 14",
			Release::Java15 => "Java 15",
			Release::Java16 => "Java 16",
			Release::Java17 => "Java 17",
			Release::Java18 => "Java 18",
			Release::Java19 => "Java 19",
			Release::Java20 => "Java 20",
			Release::Java21 => "Java 21",
			Release::Java22 => "Java 22",
			Release::Java23 => "Java 23",
		}
	}
}

impl Display for Release {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.known_as())
	}
}

use core::fmt;

/// Number of TDMA frames in a GSM hyperframe. Frame numbers wrap back to 0 here.
pub const GSM_HYPERFRAME: u32 = 26 * 51 * 2048;

/// Difference between two frame numbers, handling wrap-around of the hyperframe.
pub fn fn_diff(a: u32, b: u32) -> i32 {
    let wrap = GSM_HYPERFRAME as i32;
    let mut diff = a as i32 - b as i32;
    while diff < -wrap / 2 {
        diff += wrap;
    }
    while diff >= wrap / 2 {
        diff -= wrap;
    }
    diff
}

/// A TDMA frame number, 0..GSM_HYPERFRAME
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct GsmTime {
    pub fn_num: u32,
}

impl GsmTime {
    pub fn new(fn_num: u32) -> GsmTime {
        GsmTime { fn_num: fn_num % GSM_HYPERFRAME }
    }

    pub fn is_valid(self) -> bool {
        self.fn_num < GSM_HYPERFRAME
    }

    /// T1: superframe counter, 0..2047
    pub fn t1(self) -> u16 {
        (self.fn_num / (26 * 51)) as u16
    }

    /// T2: position in the 26-multiframe
    pub fn t2(self) -> u8 {
        (self.fn_num % 26) as u8
    }

    /// T3: position in the 51-multiframe
    pub fn t3(self) -> u8 {
        (self.fn_num % 51) as u8
    }

    /// Position of this frame within a period of `modulus` frames
    #[inline(always)]
    pub fn fn_mod(self, modulus: u32) -> u32 {
        self.fn_num % modulus
    }

    /// Add a (possibly negative) number of frames, wrapping at the hyperframe
    pub fn add_frames(self, num_frames: i32) -> GsmTime {
        let fn_num = (self.fn_num as i64 + num_frames as i64).rem_euclid(GSM_HYPERFRAME as i64);
        GsmTime { fn_num: fn_num as u32 }
    }

    /// Difference between two times in frames
    pub fn diff(self, b: Self) -> i32 {
        fn_diff(self.fn_num, b.fn_num)
    }

    /// Age of this time compared to now
    #[inline(always)]
    pub fn age(self, now: GsmTime) -> i32 {
        now.diff(self)
    }
}

impl fmt::Display for GsmTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:7}", self.fn_num)
    }
}

impl fmt::Debug for GsmTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:7}({}/{:02}/{:02})", self.fn_num, self.t1(), self.t2(), self.t3())
    }
}

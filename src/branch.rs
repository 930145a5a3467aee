//! Types for representing branches and branch outcomes.

/// A branch outcome.
#[repr(u32)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    /// Not taken
    N = 0,
    /// Taken
    T = 1
}

impl Outcome {
    /// The contribution of this outcome to a perceptron sum.
    pub fn sign(self) -> i32 {
        match self {
            Self::T => 1,
            Self::N => -1,
        }
    }
}

impl std::fmt::Debug for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Self::T => "t",
            Self::N => "n",
        };
        write!(f, "{}", s)
    }
}

impl std::ops::Not for Outcome {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Self::N => Self::T,
            Self::T => Self::N,
        }
    }
}

impl From<bool> for Outcome {
    fn from(x: bool) -> Self {
        match x {
            true => Self::T,
            false => Self::N
        }
    }
}
impl From<Outcome> for bool {
    fn from(x: Outcome) -> Self {
        match x {
            Outcome::T => true,
            Outcome::N => false,
        }
    }
}

/// Representing different kinds of branch/control-flow instructions.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum BranchKind {
    /// A direct conditional branch instruction.
    DirectBranch = BranchFlags::BRN_FLAG,

    /// A direct unconditional jump instruction.
    DirectJump   = BranchFlags::JMP_FLAG,

    /// An indirect unconditional jump instruction.
    IndirectJump = BranchFlags::JMP_FLAG | BranchFlags::IND_FLAG,

    /// A direct procedure call instruction.
    DirectCall   = BranchFlags::CALL_FLAG,

    /// An indirect procedure call instruction.
    IndirectCall = BranchFlags::CALL_FLAG | BranchFlags::IND_FLAG,

    /// A return instruction.
    Return       = BranchFlags::RET_FLAG | BranchFlags::IND_FLAG,
}
impl BranchKind {
    const DIRECT_BRANCH: u32 = BranchFlags::BRN_FLAG;
    const DIRECT_JUMP: u32 = BranchFlags::JMP_FLAG;
    const DIRECT_CALL: u32 = BranchFlags::CALL_FLAG;
    const INDIRECT_CALL: u32 = BranchFlags::CALL_FLAG | BranchFlags::IND_FLAG;
    const INDIRECT_JUMP: u32 = BranchFlags::JMP_FLAG | BranchFlags::IND_FLAG;
    const RETURN: u32 = BranchFlags::RET_FLAG | BranchFlags::IND_FLAG;
}

/// Decode the kind bits of a flag word.
/// On failure, the offending kind bits are returned.
impl TryFrom<u32> for BranchKind {
    type Error = u32;
    fn try_from(x: u32) -> Result<Self, u32> {
        match x & BranchFlags::KIND_MASK {
            Self::DIRECT_BRANCH => Ok(Self::DirectBranch),
            Self::DIRECT_JUMP   => Ok(Self::DirectJump),
            Self::DIRECT_CALL   => Ok(Self::DirectCall),
            Self::INDIRECT_JUMP => Ok(Self::IndirectJump),
            Self::INDIRECT_CALL => Ok(Self::IndirectCall),
            Self::RETURN        => Ok(Self::Return),
            bits => Err(bits),
        }
    }
}

/// Packed flags describing a branch instruction and its resolved outcome.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct BranchFlags(pub u32);
impl BranchFlags {

    const BRN_FLAG: u32   = (1 << 0);
    const JMP_FLAG: u32   = (1 << 1);
    const CALL_FLAG: u32  = (1 << 2);
    const RET_FLAG: u32   = (1 << 3);
    const IND_FLAG: u32   = (1 << 4);
    const TAKEN_FLAG: u32 = (1 << 5);

    const KIND_MASK: u32  = 0b01_1111;

    /// 4-bit instruction length
    const ILEN_MASK: u32   = 0b1111_0000_0000_0000_0000_0000_0000_0000;

    pub fn new(kind: BranchKind, outcome: Outcome) -> Self {
        let tbit = match outcome {
            Outcome::T => Self::TAKEN_FLAG,
            Outcome::N => 0,
        };
        Self(kind as u32 | tbit)
    }

    /// Set the 4-bit instruction length.
    pub fn with_ilen(self, ilen: usize) -> Self {
        let bits = ((ilen as u32) << 28) & Self::ILEN_MASK;
        Self((self.0 & !Self::ILEN_MASK) | bits)
    }

    pub fn ilen(&self) -> usize {
        ((self.0 & Self::ILEN_MASK) >> 28) as usize
    }

    pub fn is_brn(&self) -> bool { self.0 & Self::BRN_FLAG != 0 }
    pub fn is_jmp(&self) -> bool { self.0 & Self::JMP_FLAG != 0 }
    pub fn is_call(&self) -> bool { self.0 & Self::CALL_FLAG != 0 }
    pub fn is_ret(&self) -> bool { self.0 & Self::RET_FLAG != 0 }
    pub fn is_direct(&self) -> bool { self.0 & Self::IND_FLAG == 0 }
    pub fn is_indirect(&self) -> bool { self.0 & Self::IND_FLAG != 0 }
    pub fn is_taken(&self) -> bool { self.0 & Self::TAKEN_FLAG != 0 }

    pub fn kind(&self) -> Result<BranchKind, u32> {
        BranchKind::try_from(self.0)
    }
}


/// A record of branch execution.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct BranchRecord {
    /// The program counter value for this branch
    pub pc: usize,

    /// The target address evaluated for this branch
    pub tgt: usize,

    pub flags: BranchFlags,
}
impl BranchRecord {
    pub fn new(pc: usize, tgt: usize, kind: BranchKind, outcome: Outcome)
        -> Self
    {
        Self { pc, tgt, flags: BranchFlags::new(kind, outcome) }
    }

    /// A direct conditional branch with the given outcome.
    pub fn conditional(pc: usize, tgt: usize, outcome: Outcome) -> Self {
        Self::new(pc, tgt, BranchKind::DirectBranch, outcome)
    }

    /// A direct jump (always taken).
    pub fn jump(pc: usize, tgt: usize) -> Self {
        Self::new(pc, tgt, BranchKind::DirectJump, Outcome::T)
    }

    pub fn outcome(&self) -> Outcome {
        Outcome::from(self.flags.is_taken())
    }
    pub fn kind(&self) -> Result<BranchKind, u32> {
        self.flags.kind()
    }
    pub fn ilen(&self) -> usize {
        self.flags.ilen()
    }

    /// Returns 'true' if this is a conditional instruction.
    pub fn is_conditional(&self) -> bool {
        self.flags.is_brn()
    }

    /// Returns 'true' if this is an unconditional instruction.
    pub fn is_unconditional(&self) -> bool {
        !self.flags.is_brn()
    }

    /// Returns 'true' if this instruction indirectly specifies the target.
    pub fn is_indirect(&self) -> bool {
        self.flags.is_indirect()
    }

    /// Returns 'true' if this is a "call" or "return".
    pub fn is_procedural(&self) -> bool {
        self.flags.is_call() || self.flags.is_ret()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn flags_roundtrip_kind_and_outcome() {
        let r = BranchRecord::new(0x1000, 0x2000, BranchKind::IndirectCall,
            Outcome::T);
        assert_eq!(r.kind(), Ok(BranchKind::IndirectCall));
        assert_eq!(r.outcome(), Outcome::T);
        assert!(r.is_unconditional());
        assert!(r.is_indirect());
        assert!(r.is_procedural());

        let r = BranchRecord::conditional(0x1000, 0x1040, Outcome::N);
        assert!(r.is_conditional());
        assert_eq!(r.outcome(), Outcome::N);
    }

    #[test]
    fn outcome_signs() {
        assert_eq!(Outcome::T.sign(), 1);
        assert_eq!(Outcome::N.sign(), -1);
        assert_eq!((!Outcome::T).sign() * 5, -5);
    }

    #[test]
    fn ilen_lives_in_the_top_nibble() {
        let f = BranchFlags::new(BranchKind::DirectJump, Outcome::T)
            .with_ilen(4);
        assert_eq!(f.ilen(), 4);
        assert_eq!(f.kind(), Ok(BranchKind::DirectJump));
    }

    #[test]
    fn unknown_kind_bits_are_rejected() {
        // Conditional *and* call at once
        assert_eq!(BranchFlags(0b00_0101).kind(), Err(0b00_0101));
        assert_eq!(BranchFlags(0).kind(), Err(0));
    }
}

//! Known-answer self-test.
//!
//! Vectors come from FIPS-197 Appendix C (single blocks, all key sizes) and
//! NIST SP 800-38A Appendix F (CBC and CFB128, four blocks, all key sizes).
//! The self-test is meant for startup or build-time verification and is not
//! used by any of the cipher operations.

use core::fmt;

use tracing::{error, info};

use crate::block::Block;
use crate::error::{Error, Result};
use crate::key::{Context, Direction};
use crate::modes::{cbc_transform, cfb128_transform};

const FIPS_KEY_128: [u8; 16] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
    0x0f,
];

const FIPS_KEY_192: [u8; 24] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
    0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17,
];

const FIPS_KEY_256: [u8; 32] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
    0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x1b, 0x1c, 0x1d, 0x1e, 0x1f,
];

const FIPS_PLAIN: [u8; 16] = [
    0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee,
    0xff,
];

const FIPS_128: [u8; 16] = [
    0x69, 0xc4, 0xe0, 0xd8, 0x6a, 0x7b, 0x04, 0x30, 0xd8, 0xcd, 0xb7, 0x80, 0x70, 0xb4, 0xc5,
    0x5a,
];

const FIPS_192: [u8; 16] = [
    0xdd, 0xa9, 0x7c, 0xa4, 0x86, 0x4c, 0xdf, 0xe0, 0x6e, 0xaf, 0x70, 0xa0, 0xec, 0x0d, 0x71,
    0x91,
];

const FIPS_256: [u8; 16] = [
    0x8e, 0xa2, 0xb7, 0xca, 0x51, 0x67, 0x45, 0xbf, 0xea, 0xfc, 0x49, 0x90, 0x4b, 0x49, 0x60,
    0x89,
];

const ZERO_128: [u8; 16] = [
    0xc6, 0xa1, 0x3b, 0x37, 0x87, 0x8f, 0x5b, 0x82, 0x6f, 0x4f, 0x81, 0x62, 0xa1, 0xc8, 0xd8,
    0x79,
];

const NIST_KEY_128: [u8; 16] = [
    0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf, 0x4f,
    0x3c,
];

const NIST_KEY_192: [u8; 24] = [
    0x8e, 0x73, 0xb0, 0xf7, 0xda, 0x0e, 0x64, 0x52, 0xc8, 0x10, 0xf3, 0x2b, 0x80, 0x90, 0x79, 0xe5,
    0x62, 0xf8, 0xea, 0xd2, 0x52, 0x2c, 0x6b, 0x7b,
];

const NIST_KEY_256: [u8; 32] = [
    0x60, 0x3d, 0xeb, 0x10, 0x15, 0xca, 0x71, 0xbe, 0x2b, 0x73, 0xae, 0xf0, 0x85, 0x7d, 0x77, 0x81,
    0x1f, 0x35, 0x2c, 0x07, 0x3b, 0x61, 0x08, 0xd7, 0x2d, 0x98, 0x10, 0xa3, 0x09, 0x14, 0xdf, 0xf4,
];

const NIST_IV: [u8; 16] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
    0x0f,
];

const NIST_PLAIN: [u8; 64] = [
    0x6b, 0xc1, 0xbe, 0xe2, 0x2e, 0x40, 0x9f, 0x96, 0xe9, 0x3d, 0x7e, 0x11, 0x73, 0x93, 0x17, 0x2a,
    0xae, 0x2d, 0x8a, 0x57, 0x1e, 0x03, 0xac, 0x9c, 0x9e, 0xb7, 0x6f, 0xac, 0x45, 0xaf, 0x8e, 0x51,
    0x30, 0xc8, 0x1c, 0x46, 0xa3, 0x5c, 0xe4, 0x11, 0xe5, 0xfb, 0xc1, 0x19, 0x1a, 0x0a, 0x52, 0xef,
    0xf6, 0x9f, 0x24, 0x45, 0xdf, 0x4f, 0x9b, 0x17, 0xad, 0x2b, 0x41, 0x7b, 0xe6, 0x6c, 0x37, 0x10,
];

const CBC_128: [u8; 64] = [
    0x76, 0x49, 0xab, 0xac, 0x81, 0x19, 0xb2, 0x46, 0xce, 0xe9, 0x8e, 0x9b, 0x12, 0xe9, 0x19, 0x7d,
    0x50, 0x86, 0xcb, 0x9b, 0x50, 0x72, 0x19, 0xee, 0x95, 0xdb, 0x11, 0x3a, 0x91, 0x76, 0x78, 0xb2,
    0x73, 0xbe, 0xd6, 0xb8, 0xe3, 0xc1, 0x74, 0x3b, 0x71, 0x16, 0xe6, 0x9e, 0x22, 0x22, 0x95, 0x16,
    0x3f, 0xf1, 0xca, 0xa1, 0x68, 0x1f, 0xac, 0x09, 0x12, 0x0e, 0xca, 0x30, 0x75, 0x86, 0xe1, 0xa7,
];

const CBC_192: [u8; 64] = [
    0x4f, 0x02, 0x1d, 0xb2, 0x43, 0xbc, 0x63, 0x3d, 0x71, 0x78, 0x18, 0x3a, 0x9f, 0xa0, 0x71, 0xe8,
    0xb4, 0xd9, 0xad, 0xa9, 0xad, 0x7d, 0xed, 0xf4, 0xe5, 0xe7, 0x38, 0x76, 0x3f, 0x69, 0x14, 0x5a,
    0x57, 0x1b, 0x24, 0x20, 0x12, 0xfb, 0x7a, 0xe0, 0x7f, 0xa9, 0xba, 0xac, 0x3d, 0xf1, 0x02, 0xe0,
    0x08, 0xb0, 0xe2, 0x79, 0x88, 0x59, 0x88, 0x81, 0xd9, 0x20, 0xa9, 0xe6, 0x4f, 0x56, 0x15, 0xcd,
];

const CBC_256: [u8; 64] = [
    0xf5, 0x8c, 0x4c, 0x04, 0xd6, 0xe5, 0xf1, 0xba, 0x77, 0x9e, 0xab, 0xfb, 0x5f, 0x7b, 0xfb, 0xd6,
    0x9c, 0xfc, 0x4e, 0x96, 0x7e, 0xdb, 0x80, 0x8d, 0x67, 0x9f, 0x77, 0x7b, 0xc6, 0x70, 0x2c, 0x7d,
    0x39, 0xf2, 0x33, 0x69, 0xa9, 0xd9, 0xba, 0xcf, 0xa5, 0x30, 0xe2, 0x63, 0x04, 0x23, 0x14, 0x61,
    0xb2, 0xeb, 0x05, 0xe2, 0xc3, 0x9b, 0xe9, 0xfc, 0xda, 0x6c, 0x19, 0x07, 0x8c, 0x6a, 0x9d, 0x1b,
];

const CFB_128: [u8; 64] = [
    0x3b, 0x3f, 0xd9, 0x2e, 0xb7, 0x2d, 0xad, 0x20, 0x33, 0x34, 0x49, 0xf8, 0xe8, 0x3c, 0xfb, 0x4a,
    0xc8, 0xa6, 0x45, 0x37, 0xa0, 0xb3, 0xa9, 0x3f, 0xcd, 0xe3, 0xcd, 0xad, 0x9f, 0x1c, 0xe5, 0x8b,
    0x26, 0x75, 0x1f, 0x67, 0xa3, 0xcb, 0xb1, 0x40, 0xb1, 0x80, 0x8c, 0xf1, 0x87, 0xa4, 0xf4, 0xdf,
    0xc0, 0x4b, 0x05, 0x35, 0x7c, 0x5d, 0x1c, 0x0e, 0xea, 0xc4, 0xc6, 0x6f, 0x9f, 0xf7, 0xf2, 0xe6,
];

const CFB_192: [u8; 64] = [
    0xcd, 0xc8, 0x0d, 0x6f, 0xdd, 0xf1, 0x8c, 0xab, 0x34, 0xc2, 0x59, 0x09, 0xc9, 0x9a, 0x41, 0x74,
    0x67, 0xce, 0x7f, 0x7f, 0x81, 0x17, 0x36, 0x21, 0x96, 0x1a, 0x2b, 0x70, 0x17, 0x1d, 0x3d, 0x7a,
    0x2e, 0x1e, 0x8a, 0x1d, 0xd5, 0x9b, 0x88, 0xb1, 0xc8, 0xe6, 0x0f, 0xed, 0x1e, 0xfa, 0xc4, 0xc9,
    0xc0, 0x5f, 0x9f, 0x9c, 0xa9, 0x83, 0x4f, 0xa0, 0x42, 0xae, 0x8f, 0xba, 0x58, 0x4b, 0x09, 0xff,
];

const CFB_256: [u8; 64] = [
    0xdc, 0x7e, 0x84, 0xbf, 0xda, 0x79, 0x16, 0x4b, 0x7e, 0xcd, 0x84, 0x86, 0x98, 0x5d, 0x38, 0x60,
    0x39, 0xff, 0xed, 0x14, 0x3b, 0x28, 0xb1, 0xc8, 0x32, 0x11, 0x3c, 0x63, 0x31, 0xe5, 0x40, 0x7b,
    0xdf, 0x10, 0x13, 0x24, 0x15, 0xe5, 0x4b, 0x92, 0xa1, 0x3e, 0xd0, 0xa8, 0x26, 0x7a, 0xe2, 0xf9,
    0x75, 0xa3, 0x85, 0x74, 0x1a, 0xb9, 0xce, 0xf8, 0x20, 0x31, 0x62, 0x3d, 0x55, 0xb1, 0xe4, 0x71,
];

/// Single-block vector.
#[derive(Clone, Copy, Debug)]
struct EcbVector<'a> {
    key: &'a [u8],
    plain: Block,
    cipher: Block,
}

/// Four-block chaining-mode vector sharing `NIST_IV` and `NIST_PLAIN`.
#[derive(Clone, Copy, Debug)]
struct ModeVector<'a> {
    key: &'a [u8],
    cipher: [u8; 64],
}

#[derive(Clone, Copy, Debug)]
struct Vectors<'a> {
    ecb: &'a [EcbVector<'a>],
    cbc: &'a [ModeVector<'a>],
    cfb: &'a [ModeVector<'a>],
}

const ECB_VECTORS: [EcbVector<'static>; 4] = [
    EcbVector {
        key: &FIPS_KEY_128,
        plain: FIPS_PLAIN,
        cipher: FIPS_128,
    },
    EcbVector {
        key: &FIPS_KEY_192,
        plain: FIPS_PLAIN,
        cipher: FIPS_192,
    },
    EcbVector {
        key: &FIPS_KEY_256,
        plain: FIPS_PLAIN,
        cipher: FIPS_256,
    },
    EcbVector {
        key: &FIPS_KEY_128,
        plain: [0u8; 16],
        cipher: ZERO_128,
    },
];

const CBC_VECTORS: [ModeVector<'static>; 3] = [
    ModeVector {
        key: &NIST_KEY_128,
        cipher: CBC_128,
    },
    ModeVector {
        key: &NIST_KEY_192,
        cipher: CBC_192,
    },
    ModeVector {
        key: &NIST_KEY_256,
        cipher: CBC_256,
    },
];

const CFB_VECTORS: [ModeVector<'static>; 3] = [
    ModeVector {
        key: &NIST_KEY_128,
        cipher: CFB_128,
    },
    ModeVector {
        key: &NIST_KEY_192,
        cipher: CFB_192,
    },
    ModeVector {
        key: &NIST_KEY_256,
        cipher: CFB_256,
    },
];

const BUILTIN: Vectors<'static> = Vectors {
    ecb: &ECB_VECTORS,
    cbc: &CBC_VECTORS,
    cfb: &CFB_VECTORS,
};

/// Mode exercised by a vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Single block, no chaining.
    Ecb,
    /// Cipher Block Chaining.
    Cbc,
    /// 128-bit Cipher Feedback.
    Cfb128,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ecb => f.write_str("ECB"),
            Self::Cbc => f.write_str("CBC"),
            Self::Cfb128 => f.write_str("CFB128"),
        }
    }
}

/// Outcome of one known-answer check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VectorOutcome {
    /// Mode under test.
    pub mode: Mode,
    /// Key length in bits.
    pub key_bits: usize,
    /// Direction under test.
    pub direction: Direction,
    /// Whether the output matched the expected bytes.
    pub passed: bool,
}

impl fmt::Display for VectorOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction {
            Direction::Encrypt => "enc",
            Direction::Decrypt => "dec",
        };
        let status = if self.passed { "passed" } else { "failed" };
        write!(f, "AES-{}-{} ({dir}): {status}", self.mode, self.key_bits)
    }
}

/// Per-vector results of a self-test run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelfTestReport {
    /// Outcomes in execution order.
    pub outcomes: Vec<VectorOutcome>,
}

impl SelfTestReport {
    /// Number of vectors that reproduced.
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    /// Number of vectors that did not reproduce.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    /// True when every vector reproduced.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Runs every built-in vector and returns the per-vector report.
///
/// Failures are recorded in the report rather than returned as an error.
pub fn run_vectors(verbose: bool) -> SelfTestReport {
    run(&BUILTIN, verbose)
}

/// Runs the built-in vectors, failing with [`Error::SelfTestFailed`] if any
/// vector does not reproduce.
pub fn self_test(verbose: bool) -> Result<SelfTestReport> {
    into_result(run_vectors(verbose))
}

fn into_result(report: SelfTestReport) -> Result<SelfTestReport> {
    if report.is_success() {
        Ok(report)
    } else {
        Err(Error::SelfTestFailed {
            failed: report.failed(),
            total: report.outcomes.len(),
        })
    }
}

fn run(vectors: &Vectors<'_>, verbose: bool) -> SelfTestReport {
    let mut report = SelfTestReport::default();
    let mut record = |mode: Mode, key: &[u8], direction: Direction, passed: Result<bool>| {
        let outcome = VectorOutcome {
            mode,
            key_bits: key.len() * 8,
            direction,
            passed: passed.unwrap_or(false),
        };
        if verbose {
            if outcome.passed {
                info!(target: "aesx::selftest", "{}", outcome);
            } else {
                error!(target: "aesx::selftest", "{}", outcome);
            }
        }
        report.outcomes.push(outcome);
    };

    for direction in [Direction::Decrypt, Direction::Encrypt] {
        for v in vectors.ecb {
            record(Mode::Ecb, v.key, direction, check_ecb(v, direction));
        }
    }
    for direction in [Direction::Decrypt, Direction::Encrypt] {
        for v in vectors.cbc {
            record(Mode::Cbc, v.key, direction, check_cbc(v, direction));
        }
    }
    for direction in [Direction::Decrypt, Direction::Encrypt] {
        for v in vectors.cfb {
            record(Mode::Cfb128, v.key, direction, check_cfb(v, direction));
        }
    }

    if verbose {
        info!(
            target: "aesx::selftest",
            passed = report.passed(),
            failed = report.failed(),
            "self-test finished"
        );
    }
    report
}

fn check_ecb(v: &EcbVector<'_>, direction: Direction) -> Result<bool> {
    let ctx = Context::new(direction, v.key)?;
    Ok(match direction {
        Direction::Encrypt => ctx.encrypt_block(&v.plain) == v.cipher,
        Direction::Decrypt => ctx.decrypt_block(&v.cipher) == v.plain,
    })
}

fn check_cbc(v: &ModeVector<'_>, direction: Direction) -> Result<bool> {
    let ctx = Context::new(direction, v.key)?;
    let (input, expected) = match direction {
        Direction::Encrypt => (&NIST_PLAIN, &v.cipher),
        Direction::Decrypt => (&v.cipher, &NIST_PLAIN),
    };
    let mut iv = NIST_IV;
    let mut out = [0u8; 64];
    cbc_transform(&ctx, direction, &mut iv, input, &mut out)?;
    Ok(&out == expected)
}

fn check_cfb(v: &ModeVector<'_>, direction: Direction) -> Result<bool> {
    // CFB runs the forward cipher in both directions.
    let ctx = Context::schedule_encrypt(v.key)?;
    let (input, expected) = match direction {
        Direction::Encrypt => (&NIST_PLAIN, &v.cipher),
        Direction::Decrypt => (&v.cipher, &NIST_PLAIN),
    };
    let mut iv = NIST_IV;
    let mut offset = 0;
    let mut out = [0u8; 64];
    cfb128_transform(&ctx, direction, &mut offset, &mut iv, input, &mut out)?;
    Ok(&out == expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::Corruption;
    use std::sync::{Arc, Mutex};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{self, Layer, SubscriberExt};

    #[test]
    fn builtin_vectors_pass() {
        let report = self_test(false).expect("unmodified cipher passes");
        assert_eq!(report.outcomes.len(), 2 * (4 + 3 + 3));
        assert!(report.is_success());
    }

    /// Collects the levels of self-test events seen while `f` runs.
    fn captured_levels<T>(f: impl FnOnce() -> T) -> (T, Vec<Level>) {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::registry().with(captured.clone());
        let value = tracing::subscriber::with_default(subscriber, f);
        let levels = captured.0.lock().unwrap().clone();
        (value, levels)
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<Level>>>);

    impl<S: Subscriber> Layer<S> for Captured {
        fn on_event(&self, event: &Event<'_>, _ctx: layer::Context<'_, S>) {
            if event.metadata().target() == "aesx::selftest" {
                self.0.lock().unwrap().push(*event.metadata().level());
            }
        }
    }

    #[test]
    fn verbose_run_matches_quiet_run() {
        assert_eq!(run_vectors(true), run_vectors(false));
    }

    #[test]
    fn verbose_run_logs_every_vector_and_summary() {
        let (report, levels) = captured_levels(|| run_vectors(true));
        assert_eq!(levels.len(), report.outcomes.len() + 1);
        assert!(levels.iter().all(|level| *level == Level::INFO));
    }

    #[test]
    fn quiet_run_logs_nothing() {
        let (report, levels) = captured_levels(|| run_vectors(false));
        assert!(report.is_success());
        assert!(levels.is_empty());
    }

    #[test]
    fn verbose_run_logs_failures_as_errors() {
        let mut ecb = ECB_VECTORS;
        ecb[0].plain[15] ^= 0x01;
        let vectors = Vectors { ecb: &ecb, ..BUILTIN };
        let (report, levels) = captured_levels(|| run(&vectors, true));
        assert_eq!(report.failed(), 2);
        let errors = levels.iter().filter(|level| **level == Level::ERROR).count();
        assert_eq!(errors, 2);
        assert_eq!(levels.len(), 21);
    }

    #[test]
    fn corrupted_round_constant_fails_self_test() {
        // Only the AES-128 schedule reaches the tenth round constant.
        let _corruption = Corruption::rcon(9, 0x37);
        assert_eq!(
            self_test(false).unwrap_err(),
            Error::SelfTestFailed {
                failed: 8,
                total: 20
            }
        );
    }

    #[test]
    fn corrupted_first_round_constant_fails_every_vector() {
        let _corruption = Corruption::rcon(0, 0x03);
        let report = run_vectors(false);
        assert_eq!(report.failed(), report.outcomes.len());
    }

    #[test]
    fn corrupted_sbox_entry_fails_self_test() {
        // FIPS_PLAIN and FIPS_KEY_128 share their first byte, so round one
        // substitutes 0x00.
        let _corruption = Corruption::sbox(0x00, 0x62);
        let err = self_test(false).unwrap_err();
        assert!(matches!(err, Error::SelfTestFailed { failed, total: 20 } if failed > 0));
        let report = run_vectors(false);
        assert!(!report.outcomes[4].passed, "{}", report.outcomes[4]);
    }

    #[test]
    fn tables_are_restored_after_corruption() {
        {
            let _corruption = Corruption::rcon(9, 0x37);
            assert!(!run_vectors(false).is_success());
        }
        assert!(self_test(false).is_ok());
    }

    #[test]
    fn corrupted_ecb_vector_is_reported() {
        let mut ecb = ECB_VECTORS;
        ecb[1].cipher[0] ^= 0x01;
        let vectors = Vectors { ecb: &ecb, ..BUILTIN };
        let report = run(&vectors, false);
        // Both the encrypt and the decrypt check use the tampered block.
        assert_eq!(report.failed(), 2);
        let failing: Vec<_> = report.outcomes.iter().filter(|o| !o.passed).collect();
        assert!(failing.iter().all(|o| o.mode == Mode::Ecb && o.key_bits == 192));
        assert_eq!(
            into_result(report).unwrap_err(),
            Error::SelfTestFailed {
                failed: 2,
                total: 20
            }
        );
    }

    #[test]
    fn corrupted_chaining_vectors_are_reported() {
        let mut cbc = CBC_VECTORS;
        cbc[2].cipher[63] ^= 0x80;
        let mut cfb = CFB_VECTORS;
        cfb[0].cipher[17] ^= 0x01;
        let vectors = Vectors {
            cbc: &cbc,
            cfb: &cfb,
            ..BUILTIN
        };
        let report = run(&vectors, false);
        assert_eq!(report.failed(), 4);
        assert!(!report.is_success());
    }

    #[test]
    fn outcome_display_names_vector() {
        let outcome = VectorOutcome {
            mode: Mode::Cbc,
            key_bits: 256,
            direction: Direction::Decrypt,
            passed: true,
        };
        assert_eq!(outcome.to_string(), "AES-CBC-256 (dec): passed");
    }
}

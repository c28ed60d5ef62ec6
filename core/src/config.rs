//! config.rs
//! Per-call compression configuration.
//!
//! A `CompressionContext` is validated once by its builder and immutable
//! afterwards. Environment overrides produce a new, re-validated context.

use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use crate::compression::{registry, CompressionCodec};
use crate::constants::{env, DEFAULT_LEVEL, MAX_BLOCK_SIZE, MAX_LEVEL, MAX_TYPESIZE};
use crate::filters::{ByteOrder, FilterKind};
use crate::utils::{align_to_typesize, best_block_size};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid compression level {level} (expected 0..={max})")]
    InvalidLevel { level: u8, max: u8 },

    #[error("block size must be non-zero")]
    ZeroBlockSize,

    #[error("block size {have} exceeds maximum {max}")]
    BlockTooLarge { have: usize, max: usize },

    #[error("invalid typesize {typesize} (expected 1..={max})")]
    InvalidTypesize { typesize: usize, max: usize },

    #[error("codec {codec} is disabled in this build")]
    CodecDisabled { codec: CompressionCodec },

    #[error("codec {codec} cannot be selected for compression")]
    CodecNotSelectable { codec: CompressionCodec },

    #[error("input of {len} bytes needs more than u32::MAX blocks")]
    InputTooLarge { len: usize },

    #[error("invalid value {value:?} for {var}")]
    InvalidOverride { var: &'static str, value: String },
}

/// Requested block size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockSize {
    /// Derived from level, codec family and typesize.
    #[default]
    Auto,
    Fixed(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionContext {
    codec: CompressionCodec,
    level: u8,
    filter: FilterKind,
    typesize: usize,
    block_size: BlockSize,
    threads: usize,
    byte_order: ByteOrder,
    checksum: bool,
}

impl Default for CompressionContext {
    fn default() -> Self {
        Self {
            codec: CompressionCodec::Default,
            level: DEFAULT_LEVEL,
            filter: FilterKind::Shuffle,
            typesize: 8,
            block_size: BlockSize::Auto,
            threads: 1,
            byte_order: ByteOrder::native(),
            checksum: false,
        }
    }
}

impl CompressionContext {
    pub fn builder() -> CompressionContextBuilder {
        CompressionContextBuilder::default()
    }

    /// Builder pre-filled with this context's values.
    pub fn to_builder(&self) -> CompressionContextBuilder {
        CompressionContextBuilder { ctx: self.clone() }
    }

    pub fn codec(&self) -> CompressionCodec { self.codec }
    pub fn level(&self) -> u8 { self.level }
    pub fn filter(&self) -> FilterKind { self.filter }
    pub fn typesize(&self) -> usize { self.typesize }
    pub fn byte_order(&self) -> ByteOrder { self.byte_order }
    pub fn checksum(&self) -> bool { self.checksum }
    pub fn requested_block_size(&self) -> BlockSize { self.block_size }

    /// Worker count with `0` resolved to the hardware parallelism.
    pub fn threads(&self) -> usize {
        match self.threads {
            0 => num_cpus::get().max(1),
            n => n,
        }
    }

    /// Effective block size for an input of `nbytes`.
    ///
    /// Fixed sizes are rounded down to whole elements (never below one
    /// element); automatic sizes never exceed the input.
    pub fn block_size_for(&self, nbytes: usize) -> usize {
        match self.block_size {
            BlockSize::Fixed(size) => align_to_typesize(size, self.typesize),
            BlockSize::Auto => best_block_size(nbytes, self.typesize, self.level, self.codec),
        }
    }

    /// Apply `BLOCZ_*` variables from the process environment.
    pub fn with_env_overrides(&self) -> Result<Self, ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from `lookup`, which maps variable names to values.
    pub fn apply_overrides<F>(&self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut b = self.to_builder();

        if let Some(v) = lookup(env::CLEVEL) {
            b = b.level(parse_var(env::CLEVEL, &v)?);
        }
        if let Some(v) = lookup(env::COMPRESSOR) {
            let codec = CompressionCodec::from_str(&v).map_err(|_| invalid(env::COMPRESSOR, &v))?;
            b = b.codec(codec);
        }
        if let Some(v) = lookup(env::SHUFFLE) {
            let filter = FilterKind::from_str(&v).map_err(|_| invalid(env::SHUFFLE, &v))?;
            b = b.filter(filter);
        }
        if let Some(v) = lookup(env::TYPESIZE) {
            b = b.typesize(parse_var(env::TYPESIZE, &v)?);
        }
        if let Some(v) = lookup(env::BLOCKSIZE) {
            // 0 asks for automatic sizing
            b = match parse_var::<usize>(env::BLOCKSIZE, &v)? {
                0 => b.block_size(BlockSize::Auto),
                n => b.block_size(BlockSize::Fixed(n)),
            };
        }
        if let Some(v) = lookup(env::NTHREADS) {
            b = b.threads(parse_var(env::NTHREADS, &v)?);
        }
        if let Some(v) = lookup(env::CHECKSUM) {
            b = b.checksum(parse_flag(env::CHECKSUM, &v)?);
        }

        let ctx = b.build()?;
        if ctx != *self {
            debug!(?ctx, "environment overrides applied");
        }
        Ok(ctx)
    }
}

fn invalid(var: &'static str, value: &str) -> ConfigError {
    ConfigError::InvalidOverride { var, value: value.to_string() }
}

fn parse_var<T: FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(var, value))
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(var, value)),
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompressionContextBuilder {
    ctx: CompressionContext,
}

impl CompressionContextBuilder {
    pub fn codec(mut self, codec: CompressionCodec) -> Self {
        self.ctx.codec = codec;
        self
    }

    pub fn level(mut self, level: u8) -> Self {
        self.ctx.level = level;
        self
    }

    pub fn filter(mut self, filter: FilterKind) -> Self {
        self.ctx.filter = filter;
        self
    }

    pub fn typesize(mut self, typesize: usize) -> Self {
        self.ctx.typesize = typesize;
        self
    }

    pub fn block_size(mut self, block_size: BlockSize) -> Self {
        self.ctx.block_size = block_size;
        self
    }

    /// `0` means one worker per hardware thread.
    pub fn threads(mut self, threads: usize) -> Self {
        self.ctx.threads = threads;
        self
    }

    pub fn byte_order(mut self, order: ByteOrder) -> Self {
        self.ctx.byte_order = order;
        self
    }

    pub fn checksum(mut self, enabled: bool) -> Self {
        self.ctx.checksum = enabled;
        self
    }

    pub fn build(self) -> Result<CompressionContext, ConfigError> {
        let ctx = self.ctx;
        if ctx.level > MAX_LEVEL {
            return Err(ConfigError::InvalidLevel { level: ctx.level, max: MAX_LEVEL });
        }
        if ctx.typesize == 0 || ctx.typesize > MAX_TYPESIZE {
            return Err(ConfigError::InvalidTypesize { typesize: ctx.typesize, max: MAX_TYPESIZE });
        }
        if let BlockSize::Fixed(size) = ctx.block_size {
            if size == 0 {
                return Err(ConfigError::ZeroBlockSize);
            }
            if size > MAX_BLOCK_SIZE {
                return Err(ConfigError::BlockTooLarge { have: size, max: MAX_BLOCK_SIZE });
            }
        }
        if !ctx.codec.is_selectable() {
            return Err(ConfigError::CodecNotSelectable { codec: ctx.codec });
        }
        if !registry::is_enabled(ctx.codec) {
            return Err(ConfigError::CodecDisabled { codec: ctx.codec });
        }
        Ok(ctx)
    }
}

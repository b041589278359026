use std::ops::{Bound, RangeBounds};

use bytemuck::cast_slice;
use wgpu::{Buffer, BufferDescriptor, BufferSlice, BufferUsages};

use crate::renderer::{RenderContext, SpriteDrawRecord};

/// GPU-side instance buffer holding [`SpriteDrawRecord`]s.
#[derive(Debug, Clone)]
pub struct RenderBuffer(Buffer);

#[derive(Debug, Clone, Copy)]
pub struct RenderBufferSlice<'a> {
    buf: &'a Buffer,
    start: u64,
    len: u64,
}

impl RenderBuffer {
    pub fn new_uninit(cap: usize, ctx: RenderContext) -> Self {
        Self(ctx.device.create_buffer(&BufferDescriptor {
            label: Some("renderer quad buffer"),
            size: (cap * size_of::<SpriteDrawRecord>()) as u64,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }))
    }

    /// Capacity in records.
    pub fn len(&self) -> usize {
        self.0.size() as usize / size_of::<SpriteDrawRecord>()
    }

    pub fn slice(&self, range: impl RangeBounds<usize>) -> RenderBufferSlice<'_> {
        let start = match range.start_bound() {
            Bound::Included(start) => *start as u64,
            Bound::Excluded(start) => *start as u64 + 1,
            Bound::Unbounded => 0,
        };

        let end = match range.end_bound() {
            Bound::Included(end) => *end as u64 + 1,
            Bound::Excluded(end) => *end as u64,
            Bound::Unbounded => self.len() as u64,
        };

        assert!(start <= end);
        assert!(end <= self.len() as u64);

        RenderBufferSlice {
            buf: &self.0,
            start,
            len: end - start,
        }
    }

}

impl<'a> RenderBufferSlice<'a> {
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// The underlying byte range, for binding as a vertex buffer.
    pub fn byte_slice(&self) -> BufferSlice<'a> {
        let stride = size_of::<SpriteDrawRecord>() as u64;

        self.buf.slice(self.start * stride..(self.start + self.len) * stride)
    }

    pub fn write(&self, records: &[SpriteDrawRecord], ctx: RenderContext) {
        assert!(records.len() <= self.len());

        ctx.queue.write_buffer(
            self.buf,
            self.start * size_of::<SpriteDrawRecord>() as u64,
            cast_slice(records),
        );
    }
}

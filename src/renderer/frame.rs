use bytemuck::bytes_of;
use glam::vec2;
use wgpu::{
    Color, CommandEncoderDescriptor, IndexFormat, LoadOp, Operations, RenderPassColorAttachment,
    RenderPassDescriptor, StoreOp, TextureView,
};

use lib_batch::Batch;

use crate::renderer::{
    ASPECT, Camera, FrameUniform, RenderBuffer, RenderContext, Renderer, SCREEN_HEIGHT,
    SCREEN_WIDTH, SpriteDrawRecord, UpscaleUniform,
};

/// One frame's submissions. While a `Frame` is live the renderer is
/// exclusively borrowed, so a second frame cannot begin until this one ends.
/// Dropping the frame presents it to the window surface.
pub struct Frame<'a> {
    pub(in crate::renderer) renderer: &'a mut Renderer,
    pub(in crate::renderer) output: &'a TextureView,
    pub(in crate::renderer) ctx: RenderContext<'a>,
}

impl Renderer {
    /// Opens a frame: uploads the camera state and clears the render target.
    pub fn begin_frame<'a>(
        &'a mut self,
        camera: &Camera,
        output: &'a TextureView,
        ctx: RenderContext<'a>,
    ) -> Frame<'a> {
        let frame_uniform = FrameUniform {
            cam_center: camera.center,
            screen_extents: vec2(SCREEN_WIDTH, SCREEN_HEIGHT) / 2.0,
        };

        ctx.queue.write_buffer(
            &self.frame_uniform_buf,
            0,
            bytes_of::<FrameUniform>(&frame_uniform),
        );

        let mut encoder = ctx
            .device
            .create_command_encoder(&CommandEncoderDescriptor::default());

        encoder.begin_render_pass(&RenderPassDescriptor {
            label: Some("renderer clear pass"),
            timestamp_writes: None,
            occlusion_query_set: None,
            depth_stencil_attachment: None,
            color_attachments: &[Some(RenderPassColorAttachment {
                view: &self.render_texture,
                depth_slice: None,
                ops: Operations {
                    load: LoadOp::Clear(camera.clear_color),
                    store: StoreOp::Store,
                },
                resolve_target: None,
            })],
        });

        ctx.queue.submit([encoder.finish()]);

        Frame {
            renderer: self,
            output,
            ctx,
        }
    }
}

impl<'a> Frame<'a> {
    /// Draws `batch` front to back in batch order: later records paint over
    /// earlier ones. With `clear_after_render` the batch's length is reset so
    /// its allocation is reused next frame.
    pub fn submit_batch(&mut self, batch: &mut Batch<SpriteDrawRecord>, clear_after_render: bool) {
        if !batch.is_empty() {
            if batch.len() > self.renderer.quad_buf.len() {
                self.renderer.quad_buf =
                    RenderBuffer::new_uninit(batch.len().next_power_of_two(), self.ctx);
            }

            self.renderer
                .quad_buf
                .slice(..batch.len())
                .write(batch.as_slice(), self.ctx);

            let mut encoder = self
                .ctx
                .device
                .create_command_encoder(&CommandEncoderDescriptor::default());

            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("renderer sprite pass"),
                timestamp_writes: None,
                occlusion_query_set: None,
                depth_stencil_attachment: None,
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &self.renderer.render_texture,
                    depth_slice: None,
                    ops: Operations {
                        load: LoadOp::Load,
                        store: StoreOp::Store,
                    },
                    resolve_target: None,
                })],
            });

            pass.set_vertex_buffer(0, self.renderer.vertex_buf.slice(..));
            pass.set_vertex_buffer(
                1,
                self.renderer.quad_buf.slice(..batch.len()).byte_slice(),
            );
            pass.set_index_buffer(self.renderer.index_buf.slice(..), IndexFormat::Uint16);
            pass.set_pipeline(&self.renderer.render_pipeline);

            // One instanced draw per contiguous run of records on the same
            // atlas, in batch order.
            let mut start = 0;
            while start < batch.len() {
                let atlas = batch[start].atlas;

                let mut end = start + 1;
                while end < batch.len() && batch[end].atlas == atlas {
                    end += 1;
                }

                match self.renderer.atlases.get(atlas.0 as usize) {
                    Some(entry) => {
                        pass.set_bind_group(0, &entry.bind_group, &[]);
                        pass.draw_indexed(0..6, 0, start as u32..end as u32);
                    }
                    None => log::error!("draw records reference unknown atlas {atlas:?}"),
                }

                start = end;
            }

            drop(pass);

            self.ctx.queue.submit([encoder.finish()]);
        }

        if clear_after_render {
            batch.clear();
        }
    }

    /// Finishes the frame; dropping it does the same.
    pub fn end(self) {}
}

impl<'a> Drop for Frame<'a> {
    fn drop(&mut self) {
        let output_aspect =
            self.output.texture().width() as f32 / self.output.texture().height() as f32;

        let dst_extents = if output_aspect < ASPECT {
            vec2(1.0, output_aspect / ASPECT)
        } else {
            vec2(ASPECT / output_aspect, 1.0)
        };

        let upscale_uniform = UpscaleUniform { dst_extents };

        self.ctx.queue.write_buffer(
            &self.renderer.upscale_uniform_buf,
            0,
            bytes_of::<UpscaleUniform>(&upscale_uniform),
        );

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&CommandEncoderDescriptor::default());

        {
            let mut upscale_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("renderer upscale pass"),
                timestamp_writes: None,
                occlusion_query_set: None,
                depth_stencil_attachment: None,
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: self.output,
                    depth_slice: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color::BLACK),
                        store: StoreOp::Store,
                    },
                    resolve_target: None,
                })],
            });

            upscale_pass.set_vertex_buffer(0, self.renderer.vertex_buf.slice(..));
            upscale_pass.set_index_buffer(self.renderer.index_buf.slice(..), IndexFormat::Uint16);
            upscale_pass.set_bind_group(0, &self.renderer.upscale_bind_group, &[]);
            upscale_pass.set_pipeline(&self.renderer.upscale_pipeline);

            upscale_pass.draw_indexed(0..6, 0, 0..1);
        }

        self.ctx.queue.submit([encoder.finish()]);
    }
}

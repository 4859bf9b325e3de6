//! Random parcel demand.
//!
//! Every `parcel_interval_hrs` the generator draws a sender and an addressee
//! uniformly in the city disk and creates a parcel between them.  When
//! same-warehouse parcels are disabled, both points are redrawn until they
//! resolve to different warehouses.

use log::trace;

use dn_core::{Point, ProcessId};

use crate::{Sim, SimError, SimResult};

/// Give up on a draw after this many same-warehouse rejections.
const MAX_REDRAWS: usize = 10_000;

#[derive(Clone, Debug)]
pub struct ParcelGenerator {
    pub process: ProcessId,
}

impl Sim {
    pub(crate) fn resume_generator(&mut self) -> SimResult<()> {
        let (sender, addressee) = self.draw_endpoints()?;
        self.create_parcel(sender, addressee)?;
        let Some(g) = &self.generator else {
            return Ok(());
        };
        self.kernel.sleep(g.process, self.config.parcel_interval_hrs)?;
        Ok(())
    }

    fn draw_endpoints(&mut self) -> SimResult<(Point, Point)> {
        let radius = self.config.city_radius_km;
        for attempt in 0..MAX_REDRAWS {
            let sender = self.rng.point_in_disk(radius);
            let addressee = self.rng.point_in_disk(radius);
            if self.config.allow_same_wh_parcels {
                return Ok((sender, addressee));
            }
            let (a, b) = (self.warehouse_index.nearest(sender), self.warehouse_index.nearest(addressee));
            if a != b {
                return Ok((sender, addressee));
            }
            trace!("same-warehouse draw {attempt} rejected");
        }
        Err(SimError::Config(
            "cannot draw a parcel between different warehouses; add warehouses or allow same-warehouse parcels"
                .into(),
        ))
    }
}

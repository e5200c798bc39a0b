use crate::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Image<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T> Image<T> {
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self, Error> {
        let expected = width.checked_mul(height).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;

        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Builds an image by evaluating `f(x, y)` in row-major order.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn as_view(&self) -> ImageView<'_, T> {
        ImageView {
            width: self.width,
            height: self.height,
            stride: self.width,
            data: &self.data,
        }
    }

    pub fn as_view_mut(&mut self) -> ImageViewMut<'_, T> {
        ImageViewMut {
            width: self.width,
            height: self.height,
            stride: self.width,
            data: &mut self.data,
        }
    }
}

impl<T: Clone> Image<T> {
    pub fn new_fill(width: usize, height: usize, value: T) -> Self {
        let len = width.checked_mul(height).expect("image size overflow");
        Self {
            width,
            height,
            data: vec![value; len],
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a, T> {
    width: usize,
    height: usize,
    stride: usize,
    data: &'a [T],
}

impl<'a, T> ImageView<'a, T> {
    pub fn from_slice(
        width: usize,
        height: usize,
        stride: usize,
        data: &'a [T],
    ) -> Result<Self, Error> {
        if stride < width {
            return Err(Error::InvalidStride);
        }

        let min_len = min_required_len(width, height, stride).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;

        if data.len() < min_len {
            return Err(Error::SizeMismatch {
                expected: min_len,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            stride,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn row(&self, y: usize) -> &'a [T] {
        assert!(y < self.height, "row index out of bounds");
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.stride + x)
    }

    pub fn subview(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Result<ImageView<'a, T>, Error> {
        if x > self.width
            || y > self.height
            || width > (self.width - x)
            || height > (self.height - y)
        {
            return Err(Error::OutOfBounds);
        }

        let start = y
            .checked_mul(self.stride)
            .and_then(|v| v.checked_add(x))
            .ok_or(Error::OutOfBounds)?;
        let min_len = min_required_len(width, height, self.stride).ok_or(Error::OutOfBounds)?;
        let tail = self.data.get(start..).ok_or(Error::OutOfBounds)?;

        if tail.len() < min_len {
            return Err(Error::OutOfBounds);
        }

        Ok(ImageView {
            width,
            height,
            stride: self.stride,
            data: tail,
        })
    }

    pub fn is_contiguous(&self) -> bool {
        self.stride == self.width
    }
}

impl<T: Clone> ImageView<'_, T> {
    /// Copies the view into a tightly packed owned image.
    pub fn to_image(&self) -> Image<T> {
        let mut data = Vec::with_capacity(self.width * self.height);
        for y in 0..self.height {
            data.extend_from_slice(self.row(y));
        }
        Image {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

#[derive(Debug)]
pub struct ImageViewMut<'a, T> {
    width: usize,
    height: usize,
    stride: usize,
    data: &'a mut [T],
}

impl<T> ImageViewMut<'_, T> {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn row(&self, y: usize) -> &[T] {
        assert!(y < self.height, "row index out of bounds");
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        assert!(y < self.height, "row index out of bounds");
        let start = y * self.stride;
        &mut self.data[start..start + self.width]
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get_mut(y * self.stride + x)
    }
}

fn min_required_len(width: usize, height: usize, stride: usize) -> Option<usize> {
    if width == 0 || height == 0 {
        return Some(0);
    }

    let rows_before_last = height.checked_sub(1)?;
    let base = rows_before_last.checked_mul(stride)?;
    base.checked_add(width)
}

/// Maps 8-bit samples onto the `[0, 1]` scale used throughout detection.
pub fn to_unit_f32(img: &ImageView<'_, u8>) -> Image<f32> {
    let mut out = Vec::with_capacity(img.width() * img.height());
    for y in 0..img.height() {
        out.extend(img.row(y).iter().map(|&px| px as f32 / 255.0));
    }

    Image {
        width: img.width(),
        height: img.height(),
        data: out,
    }
}

/// Quantizes `[0, 1]` samples back to 8 bits, saturating out-of-range values.
pub fn to_u8_saturating(img: &ImageView<'_, f32>) -> Image<u8> {
    let mut out = Vec::with_capacity(img.width() * img.height());
    for y in 0..img.height() {
        out.extend(
            img.row(y)
                .iter()
                .map(|&v| (v * 255.0).round().clamp(0.0, 255.0) as u8),
        );
    }

    Image {
        width: img.width(),
        height: img.height(),
        data: out,
    }
}

#[cfg(test)]
mod tests {
    use super::{Image, ImageView, to_u8_saturating, to_unit_f32};

    #[test]
    fn view_indexing_with_stride() {
        let data = vec![1u8, 2, 3, 99, 4, 5, 6, 88];
        let view = ImageView::from_slice(3, 2, 4, &data).expect("valid view");

        assert_eq!(view.row(0), &[1, 2, 3]);
        assert_eq!(view.row(1), &[4, 5, 6]);
        assert_eq!(view.get(0, 1), Some(&4));
        assert_eq!(view.get(2, 1), Some(&6));
        assert_eq!(view.get(3, 1), None);
        assert!(!view.is_contiguous());
    }

    #[test]
    fn strided_view_accepts_short_final_row() {
        // The last row only needs `width` elements, not a full stride.
        let data = vec![0.0f32; 4 + 3];
        let view = ImageView::from_slice(3, 2, 4, &data).expect("valid view");
        assert_eq!(view.row(1).len(), 3);

        assert!(ImageView::from_slice(5, 2, 4, &data).is_err());
    }

    #[test]
    fn subview_crops_center_and_packs() {
        let img = Image::from_fn(6, 4, |x, y| (y * 10 + x) as u8);
        let sub = img.as_view().subview(1, 1, 4, 2).expect("valid subview");

        assert_eq!(sub.stride(), 6);
        assert_eq!(sub.row(0), &[11, 12, 13, 14]);
        let packed = sub.to_image();
        assert_eq!(packed.dims(), (4, 2));
        assert_eq!(packed.data(), &[11, 12, 13, 14, 21, 22, 23, 24]);

        assert!(img.as_view().subview(3, 0, 4, 1).is_err());
    }

    #[test]
    fn view_mut_writes_rows() {
        let mut img = Image::new_fill(3, 2, 0u8);
        {
            let mut view = img.as_view_mut();
            view.row_mut(1).copy_from_slice(&[7, 8, 9]);
            *view.get_mut(0, 0).expect("in bounds") = 1;
            assert!(view.get_mut(3, 0).is_none());
        }
        assert_eq!(img.data(), &[1, 0, 0, 7, 8, 9]);
    }

    #[test]
    fn unit_scale_conversion_round_trips_u8() {
        let img8 = Image::from_vec(2, 2, vec![0u8, 51, 204, 255]).expect("valid image");
        let unit = to_unit_f32(&img8.as_view());
        assert_eq!(unit.data()[0], 0.0);
        assert_eq!(unit.data()[3], 1.0);
        assert!((unit.data()[1] - 0.2).abs() < 1e-6);

        let back = to_u8_saturating(&unit.as_view());
        assert_eq!(back.data(), img8.data());

        let wild = Image::from_vec(2, 1, vec![-0.3f32, 1.7]).expect("valid image");
        assert_eq!(to_u8_saturating(&wild.as_view()).data(), &[0, 255]);
    }
}
